mod auth;
mod designs;
mod health_check;
mod optimizations;
mod projects;
mod support;

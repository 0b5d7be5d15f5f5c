use std::collections::HashMap;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::project::{NewProject, Paging, Project, ProjectView, UpdateProject};
use crate::models::Id;
use crate::repo::projects as projects_repo;

#[derive(Clone)]
pub struct ProjectService {
    db: DbPool,
}

impl ProjectService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, owner_id: Id, input: NewProject) -> Result<Project, AppError> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".into()));
        }
        crate::db::with_conn(&self.db, move |conn| projects_repo::insert(conn, owner_id, input)).await
    }

    async fn view_for(&self, conn: &rusqlite::Connection, project: Project) -> Result<ProjectView, AppError> {
        let design_count = projects_repo::design_count(conn, project.id)?;
        let optimization_count = projects_repo::optimization_count(conn, project.id)?;
        Ok(ProjectView {
            project,
            design_count,
            optimization_count,
            children: None,
        })
    }

    /// Loads a project with its denormalised counts and direct children.
    pub async fn get(&self, id: Id, owner_id: Id) -> Result<ProjectView, AppError> {
        crate::db::with_conn(&self.db, move |conn| {
            let project = projects_repo::find_by_id_for_owner(conn, id, owner_id)?.ok_or(AppError::NotFound)?;
            let design_count = projects_repo::design_count(conn, project.id)?;
            let optimization_count = projects_repo::optimization_count(conn, project.id)?;
            let children = projects_repo::list_children(conn, Some(project.id), owner_id)?
                .into_iter()
                .map(|child| {
                    let design_count = projects_repo::design_count(conn, child.id)?;
                    let optimization_count = projects_repo::optimization_count(conn, child.id)?;
                    Ok(ProjectView {
                        project: child,
                        design_count,
                        optimization_count,
                        children: None,
                    })
                })
                .collect::<Result<Vec<_>, AppError>>()?;

            Ok(ProjectView {
                project,
                design_count,
                optimization_count,
                children: Some(children),
            })
        })
        .await
    }

    pub async fn list(&self, owner_id: Id, paging: Paging) -> Result<Vec<ProjectView>, AppError> {
        crate::db::with_conn(&self.db, move |conn| {
            projects_repo::list_for_owner(conn, owner_id, &paging)?
                .into_iter()
                .map(|project| {
                    let design_count = projects_repo::design_count(conn, project.id)?;
                    let optimization_count = projects_repo::optimization_count(conn, project.id)?;
                    Ok(ProjectView {
                        project,
                        design_count,
                        optimization_count,
                        children: None,
                    })
                })
                .collect()
        })
        .await
    }

    pub async fn list_children(&self, parent_id: Option<Id>, owner_id: Id) -> Result<Vec<Project>, AppError> {
        crate::db::with_conn(&self.db, move |conn| projects_repo::list_children(conn, parent_id, owner_id)).await
    }

    /// Builds the full owned forest: first pass indexes every project by id,
    /// second pass attaches each non-root to its parent's `children`, third
    /// pass collects the remaining roots.
    pub async fn tree(&self, owner_id: Id) -> Result<Vec<ProjectView>, AppError> {
        crate::db::with_conn(&self.db, move |conn| {
            let all = projects_repo::list_all_for_owner(conn, owner_id)?;

            let mut views: HashMap<Id, ProjectView> = HashMap::with_capacity(all.len());
            for project in &all {
                let design_count = projects_repo::design_count(conn, project.id)?;
                let optimization_count = projects_repo::optimization_count(conn, project.id)?;
                views.insert(
                    project.id,
                    ProjectView {
                        project: project.clone(),
                        design_count,
                        optimization_count,
                        children: Some(Vec::new()),
                    },
                );
            }

            let mut children_of: HashMap<Id, Vec<Id>> = HashMap::new();
            let mut roots: Vec<Id> = Vec::new();
            for project in &all {
                match project.parent_id {
                    Some(parent_id) => children_of.entry(parent_id).or_default().push(project.id),
                    None => roots.push(project.id),
                }
            }

            fn attach(id: Id, views: &mut HashMap<Id, ProjectView>, children_of: &HashMap<Id, Vec<Id>>) -> ProjectView {
                let child_ids = children_of.get(&id).cloned().unwrap_or_default();
                let children: Vec<ProjectView> = child_ids
                    .into_iter()
                    .map(|child_id| attach(child_id, views, children_of))
                    .collect();
                let mut view = views.remove(&id).expect("project id present in views map");
                view.children = Some(children);
                view
            }

            Ok(roots
                .into_iter()
                .map(|root_id| attach(root_id, &mut views, &children_of))
                .collect())
        })
        .await
    }

    pub async fn update(&self, id: Id, owner_id: Id, input: UpdateProject) -> Result<Project, AppError> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".into()));
        }
        if input.parent_id == Some(id) {
            return Err(AppError::Validation("a project cannot be its own parent".into()));
        }
        crate::db::with_conn(&self.db, move |conn| projects_repo::update(conn, id, owner_id, input)).await
    }

    pub async fn delete(&self, id: Id, owner_id: Id) -> Result<(), AppError> {
        let deleted = crate::db::with_conn(&self.db, move |conn| projects_repo::delete(conn, id, owner_id)).await?;
        if !deleted {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

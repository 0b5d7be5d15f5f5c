use crate::db::DbPool;
use crate::error::AppError;
use crate::models::design::{Design, DesignTemplate, MoveDesign, NewDesign, UpdateDesign};
use crate::models::elements::{EdgeCut, ElementCommon, Elements, Hole, Note, Shape, Style};
use crate::models::Id;
use crate::repo::designs as designs_repo;

#[derive(Clone)]
pub struct DesignService {
    db: DbPool,
}

/// Validates an element payload against an outer rectangle of `width_mm` ×
/// `height_mm`: every element id is non-empty, every hole has positive
/// dimensions, and the holes' combined area does not exceed the outer area.
fn validate_elements(elements: &Elements, width_mm: f64, height_mm: f64) -> Result<(), AppError> {
    let ids = elements
        .shapes
        .iter()
        .map(Shape::common)
        .chain(elements.holes.iter().map(Hole::common))
        .chain(elements.cuts.iter().map(EdgeCut::common))
        .chain(elements.notes.iter().map(Note::common));

    for common in ids {
        if common.id.trim().is_empty() {
            return Err(AppError::Validation("every element must have a non-empty id".into()));
        }
    }

    for hole in &elements.holes {
        if !hole.has_positive_dimensions() {
            return Err(AppError::Validation(
                "every hole must have positive dimensions".into(),
            ));
        }
    }

    let outer_area = width_mm * height_mm;
    let hole_area = elements.total_hole_area();
    if hole_area > outer_area {
        return Err(AppError::Validation(
            "combined hole area exceeds the outer rectangle's area".into(),
        ));
    }

    Ok(())
}

fn validate_dimensions(width_mm: f64, height_mm: f64, thickness_mm: f64) -> Result<(), AppError> {
    if width_mm <= 0.0 || height_mm <= 0.0 || thickness_mm <= 0.0 {
        return Err(AppError::Validation(
            "width, height and thickness must be positive".into(),
        ));
    }
    Ok(())
}

impl DesignService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, owner_id: Id, input: NewDesign) -> Result<Design, AppError> {
        validate_dimensions(input.width_mm, input.height_mm, input.thickness_mm)?;
        validate_elements(&input.elements, input.width_mm, input.height_mm)?;
        crate::db::with_conn(&self.db, move |conn| designs_repo::insert(conn, owner_id, input)).await
    }

    pub async fn get(&self, id: Id, owner_id: Id) -> Result<Design, AppError> {
        crate::db::with_conn(&self.db, move |conn| {
            designs_repo::find_by_id_for_owner(conn, id, owner_id)?.ok_or(AppError::NotFound)
        })
        .await
    }

    pub async fn list(&self, owner_id: Id) -> Result<Vec<Design>, AppError> {
        crate::db::with_conn(&self.db, move |conn| designs_repo::list_for_owner(conn, owner_id)).await
    }

    pub async fn list_for_project(&self, project_id: Id, owner_id: Id) -> Result<Vec<Design>, AppError> {
        crate::db::with_conn(&self.db, move |conn| {
            designs_repo::list_for_project(conn, project_id, owner_id)
        })
        .await
    }

    pub async fn search(&self, owner_id: Id, query: String) -> Result<Vec<Design>, AppError> {
        crate::db::with_conn(&self.db, move |conn| designs_repo::search_for_owner(conn, owner_id, &query)).await
    }

    pub async fn update(&self, id: Id, owner_id: Id, input: UpdateDesign) -> Result<Design, AppError> {
        validate_dimensions(input.width_mm, input.height_mm, input.thickness_mm)?;
        validate_elements(&input.elements, input.width_mm, input.height_mm)?;
        crate::db::with_conn(&self.db, move |conn| designs_repo::update(conn, id, owner_id, input)).await
    }

    pub async fn move_to_project(&self, id: Id, owner_id: Id, input: MoveDesign) -> Result<Design, AppError> {
        crate::db::with_conn(&self.db, move |conn| {
            designs_repo::move_to_project(conn, id, owner_id, input.project_id)
        })
        .await
    }

    pub async fn delete(&self, id: Id, owner_id: Id) -> Result<(), AppError> {
        let deleted = crate::db::with_conn(&self.db, move |conn| designs_repo::delete(conn, id, owner_id)).await?;
        if !deleted {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// Duplicates a design into a new record owned by the same caller.
    pub async fn clone_design(&self, id: Id, owner_id: Id) -> Result<Design, AppError> {
        let source = self.get(id, owner_id).await?;
        let elements = source.elements.ok_or_else(|| {
            AppError::Validation("cannot clone a design whose elements failed to deserialize".into())
        })?;

        self.create(
            owner_id,
            NewDesign {
                project_id: source.project_id,
                name: format!("{} (copy)", source.name),
                description: source.description,
                width_mm: source.width_mm,
                height_mm: source.height_mm,
                thickness_mm: source.thickness_mm,
                elements,
            },
        )
        .await
    }

    /// Validates an elements payload against an outer rectangle without
    /// persisting anything.
    pub fn validate(width_mm: f64, height_mm: f64, thickness_mm: f64, elements: &Elements) -> Result<(), AppError> {
        validate_dimensions(width_mm, height_mm, thickness_mm)?;
        validate_elements(elements, width_mm, height_mm)
    }

    /// Built-in presets for `GET /api/designs/templates`. Not tenant
    /// data, so not persisted or owner-scoped.
    pub fn templates() -> Vec<DesignTemplate> {
        let plain = |id: &str| ElementCommon {
            id: id.to_string(),
            style: Style::default(),
            visible: true,
            locked: false,
        };

        vec![
            DesignTemplate {
                key: "simple-pane",
                name: "Simple pane",
                description: "A single rectangular pane with no holes or cuts.",
                width_mm: 600.0,
                height_mm: 400.0,
                thickness_mm: 6.0,
                elements: Elements {
                    shapes: vec![Shape::Rectangle {
                        common: plain("outer"),
                        x: 0.0,
                        y: 0.0,
                        width: 600.0,
                        height: 400.0,
                    }],
                    holes: vec![],
                    cuts: vec![],
                    notes: vec![],
                },
            },
            DesignTemplate {
                key: "pane-with-hole",
                name: "Pane with single circular hole",
                description: "A rectangular pane with one centred circular cut-out.",
                width_mm: 600.0,
                height_mm: 400.0,
                thickness_mm: 6.0,
                elements: Elements {
                    shapes: vec![Shape::Rectangle {
                        common: plain("outer"),
                        x: 0.0,
                        y: 0.0,
                        width: 600.0,
                        height: 400.0,
                    }],
                    holes: vec![Hole::Circular {
                        common: plain("hole-1"),
                        x: 300.0,
                        y: 200.0,
                        radius: 40.0,
                    }],
                    cuts: vec![],
                    notes: vec![],
                },
            },
        ]
    }
}

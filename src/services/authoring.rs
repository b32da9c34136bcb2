use sqlx::SqlitePool;
use tracing::info;

use crate::content::{self, ContentEntry, ContentItem, ContentKind, ContentPayload};
use crate::db;
use crate::error::AppError;
use crate::models::{Course, CourseContents, CourseRequest, Module, ModuleEntry, ModuleWithContents, User};
use crate::ordering;
use crate::services::enrollment;

/// Orchestrates create/update/delete of courses, modules and content items.
/// Ownership is re-derived from the database on every call.
pub struct AuthoringService {
    db: SqlitePool,
}

/// Validated outcome of one bulk module submission.
struct ModulePlan {
    deletes: Vec<String>,
    updates: Vec<(String, String, String)>,
    inserts: Vec<(String, String)>,
}

impl AuthoringService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create_course(&self, actor: &User, req: &CourseRequest) -> Result<Course, AppError> {
        db::subjects::find_subject(&self.db, &req.subject_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let course = db::courses::insert_course(&self.db, &actor.id, req)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "course slug"))?;
        info!("course {} created by {}", course.slug, actor.username);
        Ok(course)
    }

    pub async fn update_course(
        &self,
        actor: &User,
        course_id: &str,
        req: &CourseRequest,
    ) -> Result<Course, AppError> {
        let course = self.owned_course(actor, course_id).await?;

        db::subjects::find_subject(&self.db, &req.subject_id)
            .await?
            .ok_or(AppError::NotFound)?;

        db::courses::update_course(&self.db, &course.id, req)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "course slug"))?;

        db::courses::find_course(&self.db, &course.id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// One transaction: typed bodies referenced anywhere under the course go
    /// first, then the course row; modules and content rows cascade.
    pub async fn delete_course(&self, actor: &User, course_id: &str) -> Result<(), AppError> {
        let course = self.owned_course(actor, course_id).await?;

        let mut tx = self.db.begin().await?;
        db::contents::delete_bodies_for_course(&mut *tx, &course.id).await?;
        sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(&course.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("course {} deleted by {}", course.slug, actor.username);
        Ok(())
    }

    /// Bulk module submission: the whole set is validated before any write,
    /// then applied in one transaction (deletes, updates, inserts — new rows
    /// take engine-assigned positions). Blank padding rows are skipped.
    pub async fn update_course_modules(
        &self,
        actor: &User,
        course_id: &str,
        entries: &[ModuleEntry],
    ) -> Result<Vec<Module>, AppError> {
        let course = self.owned_course(actor, course_id).await?;
        let plan = validate_module_entries(entries)?;

        let mut tx = self.db.begin_with("BEGIN IMMEDIATE").await?;

        // Referenced ids must be modules of this course; checked inside the
        // transaction, still before the first write.
        for id in plan.deletes.iter().chain(plan.updates.iter().map(|(id, _, _)| id)) {
            let parent: Option<String> =
                sqlx::query_scalar("SELECT course_id FROM modules WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if parent.as_deref() != Some(course.id.as_str()) {
                return Err(AppError::NotFound);
            }
        }

        for id in &plan.deletes {
            db::contents::delete_bodies_for_module(&mut *tx, id).await?;
            db::modules::delete_module(&mut *tx, id).await?;
        }
        for (id, title, description) in &plan.updates {
            db::modules::update_module(&mut *tx, id, title, description).await?;
        }
        for (title, description) in &plan.inserts {
            let position = ordering::next_position(&mut *tx, &ordering::MODULES, &course.id).await?;
            db::modules::insert_module(&mut *tx, &course.id, title, description, position).await?;
        }

        tx.commit().await?;

        info!(
            "modules for course {} updated: {} deleted, {} changed, {} added",
            course.slug,
            plan.deletes.len(),
            plan.updates.len(),
            plan.inserts.len()
        );
        Ok(db::modules::fetch_modules(&self.db, &course.id).await?)
    }

    /// Creates the typed body and its content slot in one transaction; the
    /// slot's position comes from the ordering engine under the same write
    /// lock as the insert.
    pub async fn create_content(
        &self,
        actor: &User,
        module_id: &str,
        payload: &ContentPayload,
    ) -> Result<ContentItem, AppError> {
        let owner = db::modules::module_owner(&self.db, module_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if owner != actor.id {
            return Err(AppError::Forbidden);
        }

        let mut tx = self.db.begin_with("BEGIN IMMEDIATE").await?;
        let object_id = db::contents::insert_body(&mut *tx, &actor.id, payload).await?;
        let position = ordering::next_position(&mut *tx, &ordering::CONTENTS, module_id).await?;
        let item =
            db::contents::insert_content(&mut *tx, module_id, payload.kind(), &object_id, position)
                .await?;
        tx.commit().await?;

        info!(
            "content {} ({}) added to module {}",
            item.id,
            payload.kind().as_str(),
            module_id
        );
        Ok(item)
    }

    /// The caller must own the referenced typed body itself, not merely a
    /// body of the same type, and the payload kind must match the stored tag.
    pub async fn update_content(
        &self,
        actor: &User,
        content_id: &str,
        payload: &ContentPayload,
    ) -> Result<ContentItem, AppError> {
        let item = db::contents::find_content(&self.db, content_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let kind = ContentKind::parse(&item.content_type).ok_or(AppError::NotFound)?;

        if payload.kind() != kind {
            return Err(AppError::BadRequest(format!(
                "content is {}, payload is {}",
                kind.as_str(),
                payload.kind().as_str()
            )));
        }

        let owner = db::contents::body_owner(&self.db, kind, &item.object_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if owner != actor.id {
            return Err(AppError::Forbidden);
        }

        db::contents::update_body(&self.db, &item.object_id, payload).await?;
        Ok(item)
    }

    /// Deletes the typed body and the content slot as one logical delete;
    /// neither row can outlive the other.
    pub async fn delete_content(&self, actor: &User, content_id: &str) -> Result<(), AppError> {
        let item = db::contents::find_content(&self.db, content_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let owner = db::contents::content_owner(&self.db, content_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if owner != actor.id {
            return Err(AppError::Forbidden);
        }
        let kind = ContentKind::parse(&item.content_type).ok_or(AppError::NotFound)?;

        let mut tx = self.db.begin().await?;
        db::contents::delete_body(&mut *tx, kind, &item.object_id).await?;
        db::contents::delete_content(&mut *tx, content_id).await?;
        tx.commit().await?;

        info!("content {} deleted from module {}", content_id, item.module_id);
        Ok(())
    }

    pub async fn list_module_contents(
        &self,
        actor: &User,
        module_id: &str,
    ) -> Result<Vec<ContentEntry>, AppError> {
        let module = db::modules::find_module(&self.db, module_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let course = db::courses::find_course(&self.db, &module.course_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if !enrollment::can_view(&self.db, &course, actor).await? {
            return Err(AppError::Forbidden);
        }

        self.resolve_module_entries(&module).await
    }

    /// Full course detail for owners and enrolled students: every module
    /// with its content items resolved through the polymorphic link.
    pub async fn course_contents(
        &self,
        actor: &User,
        course_id: &str,
    ) -> Result<CourseContents, AppError> {
        let course = db::courses::find_course(&self.db, course_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if !enrollment::can_view(&self.db, &course, actor).await? {
            return Err(AppError::Forbidden);
        }

        let mut modules = Vec::new();
        for module in db::modules::fetch_modules(&self.db, &course.id).await? {
            let contents = self.resolve_module_entries(&module).await?;
            modules.push(ModuleWithContents { module, contents });
        }

        Ok(CourseContents { course, modules })
    }

    async fn resolve_module_entries(&self, module: &Module) -> Result<Vec<ContentEntry>, AppError> {
        let items = db::contents::fetch_contents(&self.db, &module.id).await?;
        let mut entries = Vec::with_capacity(items.len());
        for item in &items {
            let body = content::resolve_item(&self.db, item).await?;
            entries.push(ContentEntry {
                position: item.position,
                item: body,
            });
        }
        Ok(entries)
    }

    async fn owned_course(&self, actor: &User, course_id: &str) -> Result<Course, AppError> {
        let course = db::courses::find_course(&self.db, course_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if course.owner_id != actor.id {
            return Err(AppError::Forbidden);
        }
        Ok(course)
    }
}

fn validate_module_entries(entries: &[ModuleEntry]) -> Result<ModulePlan, AppError> {
    let mut plan = ModulePlan {
        deletes: Vec::new(),
        updates: Vec::new(),
        inserts: Vec::new(),
    };

    for (row, entry) in entries.iter().enumerate() {
        if entry.is_blank() {
            continue;
        }
        if entry.delete {
            let id = entry
                .id
                .clone()
                .ok_or_else(|| AppError::Validation(format!("row {row}: delete flag without id")))?;
            plan.deletes.push(id);
            continue;
        }
        if entry.title.trim().is_empty() {
            return Err(AppError::Validation(format!("row {row}: title must not be empty")));
        }
        match &entry.id {
            Some(id) => plan
                .updates
                .push((id.clone(), entry.title.clone(), entry.description.clone())),
            None => plan.inserts.push((entry.title.clone(), entry.description.clone())),
        }
    }

    Ok(plan)
}

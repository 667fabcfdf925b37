use crate::error::{AppError, Result};
use crate::tag::tag_dto::{CreateTagRequest, UpdateTagRequest};
use crate::tag::tag_models::Tag;
use crate::tag::tag_repository::TagRepository;
use uuid::Uuid;

#[derive(Clone)]
pub struct TagService {
    repo: TagRepository,
}

impl TagService {
    pub fn new(repo: TagRepository) -> Self {
        Self { repo }
    }

    pub async fn list_tags(&self, user_id: Uuid) -> Result<Vec<Tag>> {
        self.repo.find_all(user_id).await
    }

    pub async fn create_tag(&self, user_id: Uuid, payload: CreateTagRequest) -> Result<Tag> {
        let name = payload.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Tag name must not be blank".into()));
        }

        let tag = self
            .repo
            .create(user_id, name, payload.color.as_deref())
            .await
            .map_err(|e| e.on_unique_violation("Tag already exists"))?;

        tracing::debug!(tag_id = %tag.id, %user_id, "Tag created");
        Ok(tag)
    }

    pub async fn update_tag(
        &self,
        user_id: Uuid,
        tag_id: Uuid,
        payload: UpdateTagRequest,
    ) -> Result<Tag> {
        let name = payload.name.as_deref().map(str::trim);
        if name.is_some_and(str::is_empty) {
            return Err(AppError::Validation("Tag name must not be blank".into()));
        }

        let clear_color = payload.color.as_deref() == Some("");
        let color = payload.color.as_deref().filter(|c| !c.is_empty());

        self.repo
            .update(tag_id, user_id, name, color, clear_color)
            .await
            .map_err(|e| e.on_unique_violation("Tag already exists"))?
            .ok_or_else(|| AppError::NotFound("Tag not found".into()))
    }

    pub async fn delete_tag(&self, user_id: Uuid, tag_id: Uuid) -> Result<()> {
        if self.repo.delete(tag_id, user_id).await? == 0 {
            return Err(AppError::NotFound("Tag not found".into()));
        }
        Ok(())
    }
}

use cabinet_common::storage::AssetStore;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entity::photo;

/// One page of photos plus the total row count.
#[derive(Debug)]
pub struct PhotoPage {
    pub items: Vec<photo::Model>,
    pub total: u64,
}

pub struct PhotoService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> PhotoService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Newest-first page. `page` is 1-based; a page past the end is empty.
    pub async fn list(&self, page: u64, page_size: u64) -> Result<PhotoPage, DbErr> {
        let select = photo::Entity::find();
        let total = select.clone().paginate(self.conn, page_size).num_items().await?;

        let Some(offset) = page_offset(page, page_size, total) else {
            return Ok(PhotoPage {
                items: Vec::new(),
                total,
            });
        };

        let items = select
            .order_by_desc(photo::Column::CreatedAt)
            .order_by_desc(photo::Column::Id)
            .offset(Some(offset))
            .limit(Some(page_size))
            .all(self.conn)
            .await?;

        Ok(PhotoPage { items, total })
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<photo::Model>, DbErr> {
        photo::Entity::find_by_id(id).one(self.conn).await
    }

    pub async fn insert(&self, model: photo::ActiveModel) -> Result<photo::Model, DbErr> {
        model.insert(self.conn).await
    }

    /// Delete the row and return it, or `None` when no such photo exists.
    pub async fn delete(&self, id: Uuid) -> Result<Option<photo::Model>, DbErr> {
        let Some(model) = self.get(id).await? else {
            return Ok(None);
        };
        let result = photo::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok((result.rows_affected > 0).then_some(model))
    }
}

/// Row offset of a 1-based page, or `None` when the page starts at or past `total`.
fn page_offset(page: u64, page_size: u64, total: u64) -> Option<u64> {
    page.checked_sub(1)?
        .checked_mul(page_size)
        .filter(|offset| *offset < total)
}

/// Names of every file that may exist for a stored photo.
pub fn asset_names(filename: &str) -> [String; 3] {
    [
        filename.to_string(),
        photo::thumbnail_name(filename),
        photo::compressed_name(filename),
    ]
}

/// Best-effort removal of the original and its derived files.
///
/// Missing files are not errors; other failures are logged and swallowed.
pub async fn remove_assets(assets: &dyn AssetStore, filename: &str) {
    for name in asset_names(filename) {
        if let Err(e) = assets.delete(&name).await {
            tracing::warn!("Failed to remove asset {}: {}", name, e);
        }
    }
}

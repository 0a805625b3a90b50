//! Values exchanged with the posting service.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::listing::Listing;

/// Payload of a create-posting call. `images` keeps the listing's blob order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPosting {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub category_id: i64,
    pub images: Vec<Bytes>,
}

impl NewPosting {
    pub fn from_listing(listing: &Listing, images: Vec<Bytes>) -> Self {
        Self {
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price,
            category_id: listing.category_id,
            images,
        }
    }
}

/// Status of a posting that is still active.
///
/// `rank` is 1-based; a higher rank is less visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePostingStatus {
    pub rank: u32,
}

pub mod catalog;
pub mod providers;
pub mod wishlist;

pub use catalog::ImageUrls;
pub use providers::{MovieProvider, TmdbProvider};
pub use wishlist::{WishlistService, WishlistUpdate};

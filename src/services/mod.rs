//! Clients for the services the site depends on

pub mod site;
pub mod upload;

pub use site::{HttpSiteHooks, Publisher, PushNotification, SiteEvent, SiteHooks};
pub use upload::{HttpImageHost, ImageHost, UploadFile, UploadedAsset};

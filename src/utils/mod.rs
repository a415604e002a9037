pub mod html;
pub mod jwt;
pub mod markdown;
pub mod oauth;

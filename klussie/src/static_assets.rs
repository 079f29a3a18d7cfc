//! Stylesheet, favicon and robots file, embedded at compile time.

use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "static/"]
pub struct Assets;

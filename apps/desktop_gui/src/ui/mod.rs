//! UI layer for desktop GUI: the single dapp screen and its toast overlay.

pub mod app;

pub use app::DappGuiApp;

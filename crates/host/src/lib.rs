// folderbridge-host library
// Dev server for the local-folder workbench page

// Configuration
pub mod config;

// HTTP routes
pub mod server;

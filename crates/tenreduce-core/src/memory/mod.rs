//! Buffer accounting for operator outputs and temporaries

pub mod workspace;

pub use workspace::{
    global_workspace, ScopedShape, Workspace, WorkspaceConfig, WorkspaceLease, WorkspaceStats,
};

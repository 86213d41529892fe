//! Workspace accounting for operator buffers and scoped temporaries
//!
//! A [`Workspace`] tracks the bytes handed out to arrays and to temporary
//! shape buffers. Every allocation is represented by a guard that returns
//! its bytes when dropped, so no exit path of an operator can leak or
//! double-release a temporary.

use crate::{Result, ShapeDescriptor, TensorError};
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Workspace configuration
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Name used in diagnostics
    pub name: String,
    /// Upper bound on live bytes; `None` means unbounded
    pub limit_bytes: Option<usize>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            limit_bytes: None,
        }
    }
}

/// Snapshot of workspace counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceStats {
    pub allocated_bytes: usize,
    pub peak_bytes: usize,
    pub allocation_count: u64,
    pub deallocation_count: u64,
    pub live_temporaries: usize,
}

#[derive(Debug)]
pub struct Workspace {
    config: WorkspaceConfig,
    allocated: AtomicUsize,
    peak: AtomicUsize,
    allocation_count: AtomicU64,
    deallocation_count: AtomicU64,
    live_temporaries: AtomicUsize,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_config(WorkspaceConfig::default())
    }

    pub fn with_config(config: WorkspaceConfig) -> Self {
        Self {
            config,
            allocated: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            allocation_count: AtomicU64::new(0),
            deallocation_count: AtomicU64::new(0),
            live_temporaries: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn limit_bytes(&self) -> Option<usize> {
        self.config.limit_bytes
    }

    fn reserve(&self, bytes: usize, operation: &str) -> Result<()> {
        let mut current = self.allocated.load(Ordering::Acquire);
        loop {
            let next = current.checked_add(bytes).ok_or_else(|| {
                TensorError::allocation_error(operation, "byte count overflow", Some(bytes), None)
            })?;
            if let Some(limit) = self.config.limit_bytes {
                if next > limit {
                    return Err(TensorError::allocation_error(
                        operation,
                        &format!("workspace '{}' limit of {limit} bytes reached", self.name()),
                        Some(bytes),
                        Some(limit - current),
                    ));
                }
            }
            match self.allocated.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.peak.fetch_max(next, Ordering::AcqRel);
                    self.allocation_count.fetch_add(1, Ordering::Relaxed);
                    return Ok(());
                }
                Err(observed) => current = observed,
            }
        }
    }

    fn release(&self, bytes: usize) {
        self.allocated.fetch_sub(bytes, Ordering::AcqRel);
        self.deallocation_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Reserve `bytes` for an array buffer; released when the lease drops
    pub fn lease(self: &Arc<Self>, bytes: usize, operation: &str) -> Result<WorkspaceLease> {
        self.reserve(bytes, operation)?;
        Ok(WorkspaceLease {
            workspace: Arc::clone(self),
            bytes,
        })
    }

    /// Register a temporary shape buffer for the current scope
    pub fn scoped_shape(&self, shape: ShapeDescriptor) -> Result<ScopedShape<'_>> {
        let bytes = shape.to_shape_info().len() * std::mem::size_of::<i64>();
        self.reserve(bytes, "scoped_shape")?;
        self.live_temporaries.fetch_add(1, Ordering::AcqRel);
        Ok(ScopedShape {
            workspace: self,
            shape,
            bytes,
        })
    }

    pub fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    pub fn live_temporaries(&self) -> usize {
        self.live_temporaries.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> WorkspaceStats {
        WorkspaceStats {
            allocated_bytes: self.allocated_bytes(),
            peak_bytes: self.peak.load(Ordering::Acquire),
            allocation_count: self.allocation_count.load(Ordering::Relaxed),
            deallocation_count: self.deallocation_count.load(Ordering::Relaxed),
            live_temporaries: self.live_temporaries(),
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Bytes reserved for an array buffer
#[derive(Debug)]
pub struct WorkspaceLease {
    workspace: Arc<Workspace>,
    bytes: usize,
}

impl WorkspaceLease {
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }
}

impl Drop for WorkspaceLease {
    fn drop(&mut self) {
        self.workspace.release(self.bytes);
    }
}

/// Shape descriptor that lives only for the enclosing scope
#[derive(Debug)]
pub struct ScopedShape<'a> {
    workspace: &'a Workspace,
    shape: ShapeDescriptor,
    bytes: usize,
}

impl Deref for ScopedShape<'_> {
    type Target = ShapeDescriptor;

    fn deref(&self) -> &Self::Target {
        &self.shape
    }
}

impl Drop for ScopedShape<'_> {
    fn drop(&mut self) {
        self.workspace.release(self.bytes);
        self.workspace.live_temporaries.fetch_sub(1, Ordering::AcqRel);
    }
}

static GLOBAL_WORKSPACE: OnceLock<Arc<Workspace>> = OnceLock::new();

/// Workspace used by arrays created without an explicit one
pub fn global_workspace() -> Arc<Workspace> {
    Arc::clone(GLOBAL_WORKSPACE.get_or_init(|| {
        Arc::new(Workspace::with_config(WorkspaceConfig {
            name: "global".to_string(),
            limit_bytes: None,
        }))
    }))
}

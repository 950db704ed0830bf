//! Deep-link hand-off
//!
//! Opening a link passes control to whatever application is registered for
//! it. The composer never waits on or inspects the outcome.

use std::io::Write;
use tracing::{debug, warn};

/// Fire-and-forget link opener
pub trait LinkOpener {
    /// Hand `uri` to an external handler without waiting for it
    fn open(&self, uri: &str);
}

/// Opens links with the desktop's default URL handler
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open(&self, uri: &str) {
        debug!("Opening {}", uri);
        if let Err(e) = open::that_detached(uri) {
            warn!("Failed to launch URL handler for {}: {}", uri, e);
        }
    }
}

/// Prints links to stdout instead of opening them
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOpener;

impl LinkOpener for PrintOpener {
    fn open(&self, uri: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", uri) {
            warn!("Failed to print link: {}", e);
        }
    }
}

impl<T: LinkOpener + ?Sized> LinkOpener for Box<T> {
    fn open(&self, uri: &str) {
        (**self).open(uri)
    }
}

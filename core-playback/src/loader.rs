//! # Vendor SDK Loader
//!
//! One loader per vendor SDK (YouTube, Vimeo, HLS library, ...) shared by
//! every media element using that vendor.
//!
//! - The SDK script is injected at most once per loader lifetime.
//! - Creation requests arriving before the script has loaded wait in a FIFO
//!   queue; the queue is drained once when the script reports loaded.
//! - Requests arriving afterwards run immediately.
//!
//! [`SdkLoader::init`] and [`SdkLoader::teardown`] reset the loader so tests
//! (and hosts that tear down a page section) start from a clean slate. A
//! script load callback issued before a reset is ignored.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use bridge_traits::vendor::VendorHost;
use tracing::{debug, info};

use crate::error::Result;

type Creation = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    /// Script not requested yet.
    Idle,
    /// Script injected, waiting for its load callback.
    Loading,
    /// Script available; creations run immediately.
    Loaded,
}

struct LoaderInner {
    vendor: String,
    script_url: String,
    state: LoaderState,
    queue: VecDeque<Creation>,
    generation: u64,
}

/// Shared handle to a vendor's script loader and creation queue.
#[derive(Clone)]
pub struct SdkLoader {
    inner: Rc<RefCell<LoaderInner>>,
    host: Rc<dyn VendorHost>,
}

impl SdkLoader {
    pub fn new(
        vendor: impl Into<String>,
        script_url: impl Into<String>,
        host: Rc<dyn VendorHost>,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LoaderInner {
                vendor: vendor.into(),
                script_url: script_url.into(),
                state: LoaderState::Idle,
                queue: VecDeque::new(),
                generation: 0,
            })),
            host,
        }
    }

    pub fn vendor(&self) -> String {
        self.inner.borrow().vendor.clone()
    }

    pub fn script_url(&self) -> String {
        self.inner.borrow().script_url.clone()
    }

    pub fn state(&self) -> LoaderState {
        self.inner.borrow().state
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == LoaderState::Loaded
    }

    /// Creations waiting for the script.
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Reset to `Idle` with an empty queue.
    pub fn init(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.state = LoaderState::Idle;
        inner.queue.clear();
        inner.generation += 1;
    }

    /// Drop queued creations and forget the script. Returns how many
    /// creations were discarded.
    pub fn teardown(&self) -> usize {
        let dropped = {
            let mut inner = self.inner.borrow_mut();
            let dropped = inner.queue.len();
            inner.queue.clear();
            inner.state = LoaderState::Idle;
            inner.generation += 1;
            dropped
        };
        debug!(vendor = %self.vendor(), dropped, "sdk loader torn down");
        dropped
    }

    /// Run `create` now if the script is loaded, otherwise queue it and make
    /// sure the script has been requested.
    pub fn enqueue<F>(&self, create: F) -> Result<()>
    where
        F: FnOnce() + 'static,
    {
        let state = self.state();
        match state {
            LoaderState::Loaded => {
                create();
                Ok(())
            }
            LoaderState::Loading => {
                self.inner.borrow_mut().queue.push_back(Box::new(create));
                Ok(())
            }
            LoaderState::Idle => {
                let (vendor, url, generation) = {
                    let mut inner = self.inner.borrow_mut();
                    inner.queue.push_back(Box::new(create));
                    inner.state = LoaderState::Loading;
                    (inner.vendor.clone(), inner.script_url.clone(), inner.generation)
                };

                let weak: Weak<RefCell<LoaderInner>> = Rc::downgrade(&self.inner);
                let on_load = Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        if inner.borrow().generation == generation {
                            drain_loaded(&inner);
                        }
                    }
                });

                info!(vendor = %vendor, url = %url, "injecting vendor sdk");
                if let Err(err) = self.host.inject_script(&vendor, &url, on_load) {
                    let mut inner = self.inner.borrow_mut();
                    inner.state = LoaderState::Idle;
                    inner.queue.pop_back();
                    return Err(err.into());
                }
                Ok(())
            }
        }
    }

    /// Mark the script loaded and run every queued creation in FIFO order.
    /// Returns the number run. Later calls run nothing.
    pub fn script_loaded(&self) -> usize {
        drain_loaded(&self.inner)
    }
}

fn drain_loaded(inner: &Rc<RefCell<LoaderInner>>) -> usize {
    let vendor = {
        let mut guard = inner.borrow_mut();
        if guard.state == LoaderState::Loaded {
            return 0;
        }
        guard.state = LoaderState::Loaded;
        guard.vendor.clone()
    };

    let mut ran = 0;
    loop {
        // Release the borrow before running; creations may re-enter.
        let next = inner.borrow_mut().queue.pop_front();
        match next {
            Some(create) => {
                create();
                ran += 1;
            }
            None => break,
        }
    }
    debug!(vendor = %vendor, created = ran, "vendor sdk ready");
    ran
}

impl fmt::Debug for SdkLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SdkLoader")
            .field("vendor", &inner.vendor)
            .field("state", &inner.state)
            .field("pending", &inner.queue.len())
            .finish()
    }
}

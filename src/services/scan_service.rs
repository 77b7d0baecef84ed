//! Service for running library scans off the UI thread.
//!
//! Only one scan runs at a time. A request arriving mid-scan marks the running
//! scan as superseded: its result is dropped and the walk repeats with the
//! current folder set once it finishes.

use crate::media::FolderRoot;
use crate::scanner::{ScanFailure, ScanReport, TreeScanner};
use crate::state::AppState;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Summary passed to the completion callback.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSummary {
    pub image_count: usize,
    pub failures: Vec<ScanFailure>,
}

/// What happened to a scan request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanRequest {
    /// A worker was started.
    Started,
    /// A scan is already running and will re-run afterwards.
    Queued,
}

type CompletionCallback = dyn Fn(ScanSummary) + Send + Sync + 'static;

/// Service for managing background scans.
#[derive(Clone)]
pub struct ScanService {
    scanner: TreeScanner,
    state: AppState,
    rerun: Arc<AtomicBool>,
    on_complete: Arc<CompletionCallback>,
}

impl ScanService {
    pub fn new(scanner: TreeScanner, state: AppState) -> Self {
        Self::with_callback(scanner, state, |_| {})
    }

    /// Creates a scan service that reports each published result.
    pub fn with_callback<F>(scanner: TreeScanner, state: AppState, on_complete: F) -> Self
    where
        F: Fn(ScanSummary) + Send + Sync + 'static,
    {
        Self {
            scanner,
            state,
            rerun: Arc::new(AtomicBool::new(false)),
            on_complete: Arc::new(on_complete),
        }
    }

    /// Starts a scan on a rayon worker unless one is already running.
    pub fn request_scan(&self) -> ScanRequest {
        if self
            .state
            .scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Scan in progress, queueing a rescan");
            self.rerun.store(true, Ordering::SeqCst);
            return ScanRequest::Queued;
        }

        let service = self.clone();
        rayon::spawn(move || service.run_worker());
        ScanRequest::Started
    }

    /// Runs a scan on the calling thread, publishing its result.
    ///
    /// Returns `None` if a background scan currently holds the scanning flag.
    /// Requests queued while this scan ran start a background rescan.
    pub fn scan_now(&self) -> Option<ScanSummary> {
        if self
            .state
            .scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        let summary = self.scan_and_publish();
        self.state.scanning.store(false, Ordering::SeqCst);

        if self.rerun.swap(false, Ordering::SeqCst) {
            debug!("Rescan queued during a foreground scan");
            self.request_scan();
        }
        Some(summary)
    }

    pub fn is_scanning(&self) -> bool {
        self.state.is_scanning()
    }

    /// Worker loop. Runs while the scanning flag is held by this worker.
    fn run_worker(&self) {
        loop {
            self.rerun.store(false, Ordering::SeqCst);
            let roots = self.snapshot_roots();
            let report = self.scanner.scan(&roots);

            if self.rerun.swap(false, Ordering::SeqCst) {
                debug!("Scan superseded, discarding {} images", report.images.len());
                continue;
            }

            let summary = self.publish(report);
            self.state.scanning.store(false, Ordering::SeqCst);
            (self.on_complete)(summary);

            // A request that landed between the publish and the flag release.
            if self.rerun.swap(false, Ordering::SeqCst)
                && self
                    .state
                    .scanning
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
            {
                continue;
            }
            break;
        }
    }

    fn scan_and_publish(&self) -> ScanSummary {
        let roots = self.snapshot_roots();
        let report = self.scanner.scan(&roots);
        let summary = self.publish(report);
        (self.on_complete)(summary.clone());
        summary
    }

    fn snapshot_roots(&self) -> Vec<FolderRoot> {
        match self.state.folders.lock() {
            Ok(folders) => folders.iter().cloned().collect(),
            Err(_) => {
                warn!("Folder list unavailable, scanning nothing");
                Vec::new()
            }
        }
    }

    fn publish(&self, report: ScanReport) -> ScanSummary {
        let image_count = report.images.len();
        if let Ok(mut library) = self.state.library.lock() {
            *library = report.images;
        }
        info!(
            "Library updated: {} images, {} unreadable folders",
            image_count,
            report.failures.len()
        );
        ScanSummary {
            image_count,
            failures: report.failures,
        }
    }
}

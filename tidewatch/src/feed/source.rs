//! Position source trait.

use std::future::Future;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::pipeline::VesselSnapshot;

/// Anything that produces vessel snapshots.
///
/// Implementations send snapshots until `cancel` fires or the receiver is
/// dropped. Timestamps for a given MMSI must be non-decreasing.
pub trait PositionSource: Send + 'static {
    fn run(
        self,
        tx: mpsc::Sender<VesselSnapshot>,
        cancel: CancellationToken,
    ) -> impl Future<Output = ()> + Send;
}

use crate::decode::{build, raw_fields_from_payload};
use crate::diag::{Diagnostic, DiagnosticKind};
use crate::error::{RegisterError, Result};
use crate::metrics::MetricsHub;
use crate::objects::CATALOG;
use crate::snapshot::{ObjectStatus, SensorOrientation, Snapshot};
use crate::validate::validate_catalog;
use mxt_transport::{DeviceIo, ObjectPayload, TransportError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const DIAGNOSTIC_CAPACITY: usize = 64;

/// Owner of the register map snapshot.
///
/// The snapshot starts empty, is replaced wholesale by [`refresh`](Self::refresh)
/// and is only mutated through [`edit_field`](Self::edit_field). Readers get
/// clones of the last completed snapshot.
pub struct RegisterStore {
    pub(crate) device: Arc<dyn DeviceIo>,
    pub(crate) current: RwLock<Snapshot>,
    pub(crate) byte_locks: Mutex<HashMap<(u8, u8), Arc<tokio::sync::Mutex<()>>>>,
    /// Confirmed writes per object, bumped under the snapshot write lock
    pub(crate) write_generations: Mutex<HashMap<u8, u64>>,
    refresh_turn: tokio::sync::Mutex<()>,
    pub(crate) diagnostics: broadcast::Sender<Diagnostic>,
    pub(crate) metrics: Option<MetricsHub>,
}

impl RegisterStore {
    /// Create a store over `device` after checking every descriptor table.
    pub fn new(device: Arc<dyn DeviceIo>) -> Result<Self> {
        validate_catalog()?;
        let (diagnostics, _) = broadcast::channel(DIAGNOSTIC_CAPACITY);
        Ok(Self {
            device,
            current: RwLock::new(Snapshot::default()),
            byte_locks: Mutex::new(HashMap::new()),
            write_generations: Mutex::new(HashMap::new()),
            refresh_turn: tokio::sync::Mutex::new(()),
            diagnostics,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: MetricsHub) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn metrics(&self) -> Option<&MetricsHub> {
        self.metrics.as_ref()
    }

    /// Last completed snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.read_snapshot().clone()
    }

    /// Receiver for read/write failures and unknown payload fields.
    pub fn subscribe(&self) -> broadcast::Receiver<Diagnostic> {
        self.diagnostics.subscribe()
    }

    /// Read every catalog object and swap in the resulting snapshot.
    ///
    /// All reads are outstanding at once. Objects land at their catalog
    /// position whatever order the reads finish in. A failed object keeps its
    /// previous subtree, marked stale, or is left out when there is none.
    ///
    /// Refreshes run one at a time. An object that had a write confirmed
    /// while its read was outstanding keeps the live subtree, marked stale,
    /// instead of the bytes the read returned.
    pub async fn refresh(&self) -> Snapshot {
        let _turn = self.refresh_turn.lock().await;
        let started = self.generations();
        let mut reads = JoinSet::new();
        for ty in CATALOG {
            let device = Arc::clone(&self.device);
            let id = ty.id;
            reads.spawn(async move { (id, device.read_object(id).await) });
        }

        let mut results: HashMap<u8, std::result::Result<ObjectPayload, TransportError>> =
            HashMap::new();
        while let Some(joined) = reads.join_next().await {
            match joined {
                Ok((id, res)) => {
                    debug!(object = id, ok = res.is_ok(), "object read settled");
                    results.insert(id, res);
                }
                Err(e) => warn!(error = %e, "object read task aborted"),
            }
        }

        let previous = self.snapshot();
        let mut next = Snapshot::default();
        for ty in CATALOG {
            let read = results
                .remove(&ty.id)
                .unwrap_or_else(|| Err(TransportError::Io("read task aborted".into())));
            let built = read
                .map_err(|source| RegisterError::Read {
                    object: ty.id,
                    source,
                })
                .and_then(|payload| raw_fields_from_payload(ty.id, &payload))
                .and_then(|raw| build(ty, &raw));
            match built {
                Ok(out) => {
                    self.count(|m| m.reg.object_reads.inc());
                    for field in out.unknown {
                        self.count(|m| m.reg.unknown_fields.inc());
                        self.report(DiagnosticKind::UnknownField {
                            object: ty.id,
                            field,
                        });
                    }
                    next.objects.push(out.node);
                }
                Err(e) => {
                    self.count(|m| m.reg.object_read_failures.inc());
                    let carried = previous.object(ty.id).cloned().map(|mut node| {
                        node.status = ObjectStatus::Stale;
                        node
                    });
                    warn!(object = ty.id, error = %e, stale = carried.is_some(), "object read failed");
                    self.report(DiagnosticKind::ReadFailure {
                        object: ty.id,
                        reason: e.to_string(),
                        carried_over: carried.is_some(),
                    });
                    next.objects.extend(carried);
                }
            }
        }
        next.taken_at = OffsetDateTime::now_utc().format(&Rfc3339).ok();

        {
            let mut live = self.write_snapshot();
            let now = self.generations();
            for node in &mut next.objects {
                if node.status != ObjectStatus::Fresh || now.get(&node.id) == started.get(&node.id) {
                    continue;
                }
                if let Some(kept) = live.object(node.id) {
                    debug!(object = node.id, "write confirmed during read, keeping live values");
                    *node = kept.clone();
                    node.status = ObjectStatus::Stale;
                }
            }
            *live = next.clone();
        }

        if let Some(o) = SensorOrientation::from_snapshot(&next) {
            info!(
                invert_x = o.invert_x,
                invert_y = o.invert_y,
                switch_xy = o.switch_xy,
                "sensor orientation"
            );
        }
        let fresh = next
            .objects
            .iter()
            .filter(|o| o.status == ObjectStatus::Fresh)
            .count();
        self.count(|m| m.reg.objects_loaded.set(fresh as i64));
        info!(objects = next.objects.len(), fresh, "register map refreshed");
        next
    }

    pub(crate) fn generations(&self) -> HashMap<u8, u64> {
        self.write_generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn read_snapshot(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write_snapshot(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn report(&self, kind: DiagnosticKind) {
        // no subscribers is fine
        let _ = self.diagnostics.send(Diagnostic::now(kind));
    }

    pub(crate) fn count(&self, f: impl FnOnce(&MetricsHub)) {
        if let Some(m) = &self.metrics {
            f(m);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::DeviceImage;
    use mxt_transport::MockDevice;
    use std::time::Duration;

    fn mock() -> Arc<MockDevice> {
        let mut image = DeviceImage::blank();
        for obj in &mut image.objects {
            if obj.id == 7 {
                obj.bytes = vec![32, 10, 50, 0x03, 0, 0, 0];
            }
            if obj.id == 100 {
                obj.bytes[1] = 0xA0;
            }
        }
        Arc::new(image.to_mock().unwrap())
    }

    #[tokio::test]
    async fn snapshot_is_empty_until_first_refresh() {
        let store = RegisterStore::new(mock()).unwrap();
        assert!(store.snapshot().is_empty());
        let snap = store.refresh().await;
        assert_eq!(snap.ids(), vec![7, 8, 25, 42, 46, 47, 56, 65, 80, 100]);
        assert_eq!(store.snapshot(), snap);
        assert!(snap.taken_at.is_some());
        assert_eq!(snap.value(7, "ACTVPIPEEN"), Some(1));
        assert_eq!(
            SensorOrientation::from_snapshot(&snap),
            Some(SensorOrientation {
                invert_x: true,
                invert_y: false,
                switch_xy: true,
            })
        );
    }

    #[tokio::test]
    async fn refresh_is_idempotent() {
        let store = RegisterStore::new(mock()).unwrap();
        let first = store.refresh().await;
        let second = store.refresh().await;
        assert_eq!(first.objects, second.objects);
    }

    #[tokio::test]
    async fn failed_read_leaves_other_objects_intact() {
        let device = mock();
        device.fail_reads(65);
        let store = RegisterStore::new(device.clone()).unwrap();
        let mut diags = store.subscribe();

        let snap = store.refresh().await;
        assert!(snap.object(65).is_none());
        for id in [7, 8, 25] {
            let obj = snap.object(id).unwrap();
            assert_eq!(obj.status, ObjectStatus::Fresh);
        }
        assert_eq!(snap.value(7, "IDLEACQINT"), Some(32));
        assert_eq!(snap.value(8, "CHRGTIME"), Some(0));

        let d = diags.recv().await.unwrap();
        assert!(matches!(
            d.kind,
            DiagnosticKind::ReadFailure {
                object: 65,
                carried_over: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn failed_read_carries_previous_subtree_as_stale() {
        let device = mock();
        let store = RegisterStore::new(device.clone()).unwrap();
        let first = store.refresh().await;

        device.fail_reads(7);
        let second = store.refresh().await;
        let t7 = second.object(7).unwrap();
        assert_eq!(t7.status, ObjectStatus::Stale);
        assert_eq!(t7.fields, first.object(7).unwrap().fields);
        assert_eq!(second.ids(), first.ids());
    }

    #[tokio::test(start_paused = true)]
    async fn reverse_completion_keeps_catalog_order() {
        let device = mock();
        for (i, ty) in CATALOG.iter().enumerate() {
            let ms = (CATALOG.len() - i) as u64 * 10;
            device.delay_reads(ty.id, Duration::from_millis(ms));
        }
        let store = RegisterStore::new(device).unwrap();
        let snap = store.refresh().await;
        let expected: Vec<u8> = CATALOG.iter().map(|t| t.id).collect();
        assert_eq!(snap.ids(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_refreshes_take_turns() {
        let device = mock();
        device.delay_reads(7, Duration::from_millis(50));
        let store = RegisterStore::new(device.clone()).unwrap();

        let (a, b) = tokio::join!(store.refresh(), store.refresh());
        assert_eq!(device.peak_concurrent_reads(7), 1);
        assert_eq!(a.objects, b.objects);
        assert_eq!(store.snapshot().objects, b.objects);
    }

    #[tokio::test]
    async fn missing_objects_are_read_failures() {
        let device = Arc::new(
            MockDevice::new().with_object(7, crate::objects::T7.payload_layout(), vec![0; 7]),
        );
        let metrics = MetricsHub::new().unwrap();
        let store = RegisterStore::new(device).unwrap().with_metrics(metrics);
        let snap = store.refresh().await;
        assert_eq!(snap.ids(), vec![7]);
        let m = store.metrics().unwrap();
        assert_eq!(m.reg.object_reads.get(), 1);
        assert_eq!(m.reg.object_read_failures.get(), 9);
        assert_eq!(m.reg.objects_loaded.get(), 1);
    }
}

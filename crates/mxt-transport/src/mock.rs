use crate::{
    DeviceIo, ObjectPayload, PayloadLayout, Result, TransportError, WriteRecord,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use time::OffsetDateTime;

struct MockObject {
    layout: PayloadLayout,
    image: Vec<u8>,
}

/// An in-process device holding one byte image per object.
///
/// Reads serialize the image through the object's layout, writes patch it.
/// Failures and delays can be injected per object so that callers can
/// exercise partial refreshes and out-of-order completion.
#[derive(Default)]
pub struct MockDevice {
    objects: Mutex<HashMap<u8, MockObject>>,
    failing_reads: Mutex<HashSet<u8>>,
    failing_writes: Mutex<HashSet<u8>>,
    read_delays: Mutex<HashMap<u8, Duration>>,
    write_delays: Mutex<HashMap<u8, Duration>>,
    writes: Mutex<Vec<WriteRecord>>,
    reads_in_flight: Mutex<HashMap<u8, usize>>,
    peak_reads: Mutex<HashMap<u8, usize>>,
}

/// Counts one outstanding read until dropped.
struct ReadInFlight<'a> {
    dev: &'a MockDevice,
    id: u8,
}

impl Drop for ReadInFlight<'_> {
    fn drop(&mut self) {
        if let Some(n) = lock(&self.dev.reads_in_flight).get_mut(&self.id) {
            *n = n.saturating_sub(1);
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, id: u8, layout: PayloadLayout, image: Vec<u8>) -> Self {
        self.insert_object(id, layout, image);
        self
    }

    pub fn insert_object(&self, id: u8, layout: PayloadLayout, image: Vec<u8>) {
        lock(&self.objects).insert(id, MockObject { layout, image });
    }

    /// Current byte image of an object.
    pub fn image(&self, id: u8) -> Option<Vec<u8>> {
        lock(&self.objects).get(&id).map(|o| o.image.clone())
    }

    /// Change a byte behind the host's back, as firmware would.
    pub fn set_byte(&self, id: u8, offset: u8, value: u8) -> Result<()> {
        let mut objects = lock(&self.objects);
        let obj = objects
            .get_mut(&id)
            .ok_or(TransportError::ObjectNotFound(id))?;
        let slot = obj
            .image
            .get_mut(offset as usize)
            .ok_or(TransportError::OutOfBounds {
                object: id,
                offset,
                len: 1,
            })?;
        *slot = value;
        Ok(())
    }

    pub fn fail_reads(&self, id: u8) {
        lock(&self.failing_reads).insert(id);
    }

    pub fn fail_writes(&self, id: u8) {
        lock(&self.failing_writes).insert(id);
    }

    pub fn clear_failures(&self) {
        lock(&self.failing_reads).clear();
        lock(&self.failing_writes).clear();
    }

    pub fn delay_reads(&self, id: u8, delay: Duration) {
        lock(&self.read_delays).insert(id, delay);
    }

    pub fn delay_writes(&self, id: u8, delay: Duration) {
        lock(&self.write_delays).insert(id, delay);
    }

    /// Every write accepted so far, in arrival order.
    pub fn writes(&self) -> Vec<WriteRecord> {
        lock(&self.writes).clone()
    }

    /// Most reads of `id` that were ever outstanding at the same time.
    pub fn peak_concurrent_reads(&self, id: u8) -> usize {
        lock(&self.peak_reads).get(&id).copied().unwrap_or(0)
    }

    fn begin_read(&self, id: u8) -> ReadInFlight<'_> {
        let now = {
            let mut in_flight = lock(&self.reads_in_flight);
            let n = in_flight.entry(id).or_insert(0);
            *n += 1;
            *n
        };
        let mut peak = lock(&self.peak_reads);
        let p = peak.entry(id).or_insert(0);
        *p = (*p).max(now);
        ReadInFlight { dev: self, id }
    }

    fn read_delay(&self, id: u8) -> Option<Duration> {
        lock(&self.read_delays).get(&id).copied()
    }

    fn write_delay(&self, id: u8) -> Option<Duration> {
        lock(&self.write_delays).get(&id).copied()
    }
}

#[async_trait]
impl DeviceIo for MockDevice {
    async fn read_object(&self, id: u8) -> Result<ObjectPayload> {
        let _in_flight = self.begin_read(id);
        if let Some(delay) = self.read_delay(id) {
            tokio::time::sleep(delay).await;
        }
        if lock(&self.failing_reads).contains(&id) {
            tracing::debug!(object = id, "mock read failure injected");
            return Err(TransportError::Io(format!("read of T{id} failed")));
        }
        let objects = lock(&self.objects);
        let obj = objects.get(&id).ok_or(TransportError::ObjectNotFound(id))?;
        Ok(obj.layout.encode(&obj.image))
    }

    async fn write_register(&self, id: u8, offset: u8, data: &[u8]) -> Result<()> {
        if let Some(delay) = self.write_delay(id) {
            tokio::time::sleep(delay).await;
        }
        if lock(&self.failing_writes).contains(&id) {
            tracing::debug!(object = id, offset, "mock write failure injected");
            return Err(TransportError::Io(format!("write to T{id} failed")));
        }
        {
            let mut objects = lock(&self.objects);
            let obj = objects
                .get_mut(&id)
                .ok_or(TransportError::ObjectNotFound(id))?;
            let start = offset as usize;
            let end = start + data.len();
            if data.is_empty() || end > obj.image.len() {
                return Err(TransportError::OutOfBounds {
                    object: id,
                    offset,
                    len: data.len(),
                });
            }
            obj.image[start..end].copy_from_slice(data);
        }
        lock(&self.writes).push(WriteRecord {
            id,
            offset,
            data: data.to_vec(),
            at: OffsetDateTime::now_utc(),
        });
        Ok(())
    }
}

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Clone)]
pub struct RegisterMetrics {
    pub object_reads: IntCounter,
    pub object_read_failures: IntCounter,
    pub register_writes: IntCounter,
    pub register_write_failures: IntCounter,
    pub unknown_fields: IntCounter,
    pub objects_loaded: IntGauge,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub reg: RegisterMetrics,
}

fn counter(name: &str, help: &str) -> Result<IntCounter, String> {
    IntCounter::new(name, help).map_err(|e| format!("metrics init error: {e}"))
}

impl MetricsHub {
    pub fn new() -> Result<Self, String> {
        let registry = Registry::new();
        let reg = RegisterMetrics {
            object_reads: counter("mxt_object_reads_total", "Object reads completed")?,
            object_read_failures: counter(
                "mxt_object_read_failures_total",
                "Object reads that failed or could not be decoded",
            )?,
            register_writes: counter("mxt_register_writes_total", "Register writes confirmed")?,
            register_write_failures: counter(
                "mxt_register_write_failures_total",
                "Register writes rejected by the device",
            )?,
            unknown_fields: counter(
                "mxt_unknown_fields_total",
                "Payload fields without a descriptor",
            )?,
            objects_loaded: IntGauge::new("mxt_objects_loaded", "Objects in the current snapshot")
                .map_err(|e| format!("metrics init error: {e}"))?,
        };
        let _ = registry.register(Box::new(reg.object_reads.clone()));
        let _ = registry.register(Box::new(reg.object_read_failures.clone()));
        let _ = registry.register(Box::new(reg.register_writes.clone()));
        let _ = registry.register(Box::new(reg.register_write_failures.clone()));
        let _ = registry.register(Box::new(reg.unknown_fields.clone()));
        let _ = registry.register(Box::new(reg.objects_loaded.clone()));
        Ok(Self { registry, reg })
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_exposition_names_every_metric() {
        let hub = MetricsHub::new().unwrap();
        hub.reg.object_reads.inc();
        hub.reg.objects_loaded.set(3);
        let text = hub.encode_text();
        assert!(text.contains("mxt_object_reads_total 1"));
        assert!(text.contains("mxt_objects_loaded 3"));
        assert!(text.contains("mxt_register_write_failures_total 0"));
    }
}

use crate::objects::{object_type, CATALOG};
use anyhow::Context;
use mxt_transport::MockDevice;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Byte image of one object as stored in a device image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageObject {
    pub id: u8,
    pub bytes: Vec<u8>,
}

/// Contents of a device image file, used to seed a [`MockDevice`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceImage {
    #[serde(default)]
    pub name: Option<String>,
    pub objects: Vec<ImageObject>,
    #[serde(default)]
    pub fail_reads: Vec<u8>,
    #[serde(default)]
    pub fail_writes: Vec<u8>,
}

impl DeviceImage {
    /// Every catalog object, zero-filled to its table size.
    pub fn blank() -> Self {
        Self {
            name: Some("blank".into()),
            objects: CATALOG
                .iter()
                .map(|ty| ImageObject {
                    id: ty.id,
                    bytes: vec![0; usize::from(ty.size)],
                })
                .collect(),
            fail_reads: Vec::new(),
            fail_writes: Vec::new(),
        }
    }

    pub fn to_mock(&self) -> anyhow::Result<MockDevice> {
        let mock = MockDevice::new();
        for obj in &self.objects {
            let ty = object_type(obj.id)
                .with_context(|| format!("image object T{} is not in the catalog", obj.id))?;
            mock.insert_object(obj.id, ty.payload_layout(), obj.bytes.clone());
        }
        for id in &self.fail_reads {
            mock.fail_reads(*id);
        }
        for id in &self.fail_writes {
            mock.fail_writes(*id);
        }
        Ok(mock)
    }
}

/// Load a device image from YAML, or JSON when the extension is `.json`.
pub fn load_device_image(path: impl AsRef<Path>) -> anyhow::Result<DeviceImage> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading device image: {}", path.display()))?;
    let image: DeviceImage = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&raw).with_context(|| format!("parsing json: {}", path.display()))?
    } else {
        serde_yaml::from_str(&raw).with_context(|| format!("parsing yaml: {}", path.display()))?
    };
    Ok(image)
}

/// Load every image in `dir`, sorted by file name.
pub fn load_device_images_dir(dir: impl AsRef<Path>) -> anyhow::Result<Vec<DeviceImage>> {
    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if ext == "yml" || ext == "yaml" || ext == "json" {
                entries.push(path);
            }
        }
    }
    entries.sort();
    entries.iter().map(load_device_image).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxt_transport::DeviceIo;

    const YAML: &str = r#"
name: bench
objects:
  - id: 7
    bytes: [32, 10, 50, 3, 0, 0, 0]
fail_reads: [65]
"#;

    #[tokio::test]
    async fn yaml_image_seeds_a_mock_device() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.yaml");
        fs::write(&path, YAML).unwrap();

        let image = load_device_image(&path).unwrap();
        assert_eq!(image.name.as_deref(), Some("bench"));
        assert_eq!(image.fail_reads, vec![65]);
        assert!(image.fail_writes.is_empty());

        let mock = image.to_mock().unwrap();
        let payload = mock.read_object(7).await.unwrap();
        assert_eq!(payload["IDLEACQINT"], 32);
        assert_eq!(payload["CFG"], 3);
    }

    #[test]
    fn json_and_yaml_images_load_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.yaml"), "objects: []\nname: second\n").unwrap();
        fs::write(dir.path().join("a.json"), r#"{"name":"first","objects":[]}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let images = load_device_images_dir(dir.path()).unwrap();
        let names: Vec<_> = images.iter().filter_map(|i| i.name.clone()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn objects_outside_the_catalog_are_refused() {
        let image = DeviceImage {
            objects: vec![ImageObject {
                id: 6,
                bytes: vec![0],
            }],
            ..DeviceImage::default()
        };
        assert!(image.to_mock().is_err());
    }

    #[tokio::test]
    async fn bundled_bench_image_refreshes_cleanly() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../configs/mock-device.yaml");
        let image = load_device_image(path).unwrap();
        let device = std::sync::Arc::new(image.to_mock().unwrap());
        let store = crate::RegisterStore::new(device).unwrap();
        let snap = store.refresh().await;
        assert_eq!(snap.objects.len(), CATALOG.len());
        assert_eq!(snap.value(56, "INTTIME"), Some(25));
        assert_eq!(snap.value(56, "YLONOISEMUL"), Some(0));
        assert_eq!(snap.value(100, "XRANGE"), Some(4095));
        assert_eq!(snap.value(100, "SWITCHXY"), Some(1));
    }

    #[test]
    fn blank_image_covers_the_catalog() {
        let image = DeviceImage::blank();
        assert_eq!(image.objects.len(), CATALOG.len());
        assert_eq!(image.objects[0].bytes.len(), 7);
    }
}

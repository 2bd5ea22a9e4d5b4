use serde::Serialize;

/// Confirmation state of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NodeStatus {
    /// Value is what the device last reported or acknowledged.
    #[default]
    Confirmed,
    /// A write carrying this value is in flight.
    Pending { requested: i64 },
    /// The write carrying `requested` failed; the value shown is the last confirmed one.
    Stale { requested: i64 },
}

/// Freshness of a whole object subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStatus {
    #[default]
    Fresh,
    /// Carried over from an earlier refresh because the latest read failed.
    Stale,
}

/// One node of the presented register tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterNode {
    pub key: String,
    pub name: String,
    pub value: Option<i64>,
    pub readonly: bool,
    pub status: NodeStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RegisterNode>,
}

impl RegisterNode {
    pub fn leaf(key: String, name: &str, value: Option<i64>, readonly: bool) -> Self {
        Self {
            key,
            name: name.to_string(),
            value,
            readonly,
            status: NodeStatus::Confirmed,
            children: Vec::new(),
        }
    }

    /// Depth-first search for a node by name, this node included.
    pub fn find(&self, name: &str) -> Option<&RegisterNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut RegisterNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(name))
    }
}

/// Decoded tree for one configuration object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectNode {
    pub id: u8,
    pub key: String,
    pub name: String,
    pub status: ObjectStatus,
    pub fields: Vec<RegisterNode>,
}

impl ObjectNode {
    pub fn field(&self, name: &str) -> Option<&RegisterNode> {
        self.fields.iter().find_map(|f| f.find(name))
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut RegisterNode> {
        self.fields.iter_mut().find_map(|f| f.find_mut(name))
    }
}

/// Point-in-time register tree for every object that could be read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub objects: Vec<ObjectNode>,
    /// RFC 3339 completion time of the refresh
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<String>,
}

impl Snapshot {
    pub fn object(&self, id: u8) -> Option<&ObjectNode> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_mut(&mut self, id: u8) -> Option<&mut ObjectNode> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn ids(&self) -> Vec<u8> {
        self.objects.iter().map(|o| o.id).collect()
    }

    pub fn value(&self, id: u8, field: &str) -> Option<i64> {
        self.object(id)?.field(field)?.value
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Touchscreen orientation as configured in T100 `CFG1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorOrientation {
    pub invert_x: bool,
    pub invert_y: bool,
    pub switch_xy: bool,
}

impl SensorOrientation {
    pub fn from_cfg1(cfg1: u8) -> Self {
        Self {
            invert_x: cfg1 & 0x80 != 0,
            invert_y: cfg1 & 0x40 != 0,
            switch_xy: cfg1 & 0x20 != 0,
        }
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Option<Self> {
        let cfg1 = snapshot.value(100, "CFG1")?;
        Some(Self::from_cfg1((cfg1 & 0xFF) as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg_group() -> RegisterNode {
        let mut group = RegisterNode::leaf("t100.CFG1".into(), "CFG1", Some(0xA0), false);
        group.children = vec![
            RegisterNode::leaf("t100.CFG1.SWITCHXY".into(), "SWITCHXY", Some(1), false),
            RegisterNode::leaf("t100.CFG1.INVERTX".into(), "INVERTX", Some(1), false),
        ];
        group
    }

    #[test]
    fn find_descends_into_children() {
        let group = cfg_group();
        assert_eq!(
            group.find("INVERTX").map(|n| n.key.as_str()),
            Some("t100.CFG1.INVERTX")
        );
        assert!(group.find("INVERTY").is_none());
    }

    #[test]
    fn orientation_follows_cfg1_bits() {
        let snapshot = Snapshot {
            objects: vec![ObjectNode {
                id: 100,
                key: "t100".into(),
                name: "T100".into(),
                status: ObjectStatus::Fresh,
                fields: vec![cfg_group()],
            }],
            taken_at: None,
        };
        assert_eq!(
            SensorOrientation::from_snapshot(&snapshot),
            Some(SensorOrientation {
                invert_x: true,
                invert_y: false,
                switch_xy: true,
            })
        );
        assert_eq!(SensorOrientation::from_snapshot(&Snapshot::default()), None);
    }
}

//! Image catalog and its index.
//!
//! The catalog is a static JSON document loaded once at startup:
//!
//! ```json
//! { "images": [
//!     { "file": "p1.jpg",      "method": "original",            "person": "P1" },
//!     { "file": "p1_b50.jpg",  "method": "blur", "intensity": 50, "person": "P1" },
//!     { "file": "p1_m.jpg",    "method": "mask",                "person": "P1" }
//! ] }
//! ```
//!
//! [`CatalogIndex`] splits it into the ordered list of reference images (which
//! fixes trial order) and one image pool per de-identification method (which
//! fixes the round-robin method order).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};

// ---------------------------------------------------------------------------
// Identities and methods
// ---------------------------------------------------------------------------

/// One of the eight photographed identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Person {
    P1,
    P2,
    P3,
    P4,
    P5,
    P6,
    P7,
    P8,
}

impl Person {
    /// Every identity, in display order.
    pub const ALL: [Person; 8] = [
        Self::P1,
        Self::P2,
        Self::P3,
        Self::P4,
        Self::P5,
        Self::P6,
        Self::P7,
        Self::P8,
    ];
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = match self {
            Self::P1 => 1,
            Self::P2 => 2,
            Self::P3 => 3,
            Self::P4 => 4,
            Self::P5 => 5,
            Self::P6 => 6,
            Self::P7 => 7,
            Self::P8 => 8,
        };
        write!(f, "P{n}")
    }
}

/// How an image was produced. `Original` tags the unprocessed reference
/// photos; the others are de-identification methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Original,
    Blur,
    Mask,
    Pixel,
}

impl Method {
    /// De-identification methods in report order.
    pub const PROCESSED: [Method; 3] = [Self::Blur, Self::Mask, Self::Pixel];

    /// Mask is applied at a single strength, everything else is graded.
    pub fn has_intensity(self) -> bool {
        matches!(self, Self::Blur | Self::Pixel)
    }

    pub fn is_original(self) -> bool {
        self == Self::Original
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Original => write!(f, "original"),
            Self::Blur => write!(f, "blur"),
            Self::Mask => write!(f, "mask"),
            Self::Pixel => write!(f, "pixel"),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub file: String,
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<u32>,
    pub person: Person,
}

impl AssetRecord {
    /// Where the front-end finds this image under the asset root:
    /// `root/original/<file>` for references, `root/<method>/<file>` otherwise.
    pub fn display_path(&self, root: &Path) -> PathBuf {
        root.join(self.method.to_string()).join(&self.file)
    }
}

/// On-disk catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub images: Vec<AssetRecord>,
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Processed images of one method, in catalog order.
#[derive(Debug, Clone)]
pub struct MethodPool {
    pub method: Method,
    pub images: Vec<AssetRecord>,
}

/// Immutable partition of the catalog into references and per-method pools.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    references: Vec<AssetRecord>,
    pools: Vec<MethodPool>,
}

impl CatalogIndex {
    /// Partition `records`. Fails when there is nothing to quiz on.
    pub fn new(records: Vec<AssetRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(QuizError::EmptyCatalog);
        }

        let mut references = Vec::new();
        let mut pools: Vec<MethodPool> = Vec::new();

        for record in records {
            if record.method.is_original() {
                references.push(record);
                continue;
            }
            if record.method.has_intensity() && record.intensity.is_none() {
                log::warn!(
                    "{} image {} has no intensity; it will be scored without one",
                    record.method,
                    record.file
                );
            }
            match pools.iter_mut().find(|p| p.method == record.method) {
                Some(pool) => pool.images.push(record),
                None => pools.push(MethodPool {
                    method: record.method,
                    images: vec![record],
                }),
            }
        }

        if references.is_empty() {
            return Err(QuizError::NoReferenceImages);
        }
        if pools.is_empty() {
            return Err(QuizError::NoMethods);
        }

        log::debug!(
            "catalog indexed: {} references, methods [{}]",
            references.len(),
            pools
                .iter()
                .map(|p| format!("{}:{}", p.method, p.images.len()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self { references, pools })
    }

    /// Parse a `{ "images": [...] }` document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        Self::new(catalog.images)
    }

    /// Read and parse a catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| QuizError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reference images in encounter order. Trial `i` uses entry `i`.
    pub fn reference_images(&self) -> &[AssetRecord] {
        &self.references
    }

    /// Processed images grouped by method, methods in first-occurrence order.
    pub fn processed_by_method(&self) -> &[MethodPool] {
        &self.pools
    }

    /// Methods in round-robin order.
    pub fn methods(&self) -> impl Iterator<Item = Method> + '_ {
        self.pools.iter().map(|p| p.method)
    }

    pub fn first_method(&self) -> Method {
        self.pools[0].method
    }

    pub fn pool(&self, method: Method) -> Option<&MethodPool> {
        self.pools.iter().find(|p| p.method == method)
    }

    /// Round-robin successor of `method`, wrapping at the end. An unknown
    /// method restarts the cycle.
    pub fn next_method(&self, method: Method) -> Method {
        match self.pools.iter().position(|p| p.method == method) {
            Some(i) => self.pools[(i + 1) % self.pools.len()].method,
            None => self.first_method(),
        }
    }

    /// `(method, person)` pairs for which a pool has no image.
    pub fn coverage_gaps(&self, persons: &[Person]) -> Vec<(Method, Person)> {
        let mut gaps = Vec::new();
        for pool in &self.pools {
            for &person in persons {
                if !pool.images.iter().any(|img| img.person == person) {
                    gaps.push((pool.method, person));
                }
            }
        }
        gaps
    }

    /// Distinct intensities across all pools, ascending.
    pub fn intensities(&self) -> Vec<u32> {
        let mut values: Vec<u32> = self
            .pools
            .iter()
            .flat_map(|p| p.images.iter().filter_map(|img| img.intensity))
            .collect();
        values.sort_unstable();
        values.dedup();
        values
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(file: &str, method: Method, intensity: Option<u32>, person: Person) -> AssetRecord {
        AssetRecord {
            file: file.to_string(),
            method,
            intensity,
            person,
        }
    }

    #[test]
    fn test_partition_preserves_order() {
        let index = CatalogIndex::new(vec![
            rec("p2.jpg", Method::Original, None, Person::P2),
            rec("p1_px.jpg", Method::Pixel, Some(50), Person::P1),
            rec("p1.jpg", Method::Original, None, Person::P1),
            rec("p1_b.jpg", Method::Blur, Some(75), Person::P1),
            rec("p2_px.jpg", Method::Pixel, Some(75), Person::P2),
        ])
        .unwrap();

        let refs: Vec<&str> = index
            .reference_images()
            .iter()
            .map(|r| r.file.as_str())
            .collect();
        assert_eq!(refs, vec!["p2.jpg", "p1.jpg"]);

        let methods: Vec<Method> = index.methods().collect();
        assert_eq!(methods, vec![Method::Pixel, Method::Blur]);

        let pixel: Vec<&str> = index
            .pool(Method::Pixel)
            .unwrap()
            .images
            .iter()
            .map(|r| r.file.as_str())
            .collect();
        assert_eq!(pixel, vec!["p1_px.jpg", "p2_px.jpg"]);
        assert!(index.pool(Method::Mask).is_none());
    }

    #[test]
    fn test_next_method_wraps() {
        let index = CatalogIndex::new(vec![
            rec("o.jpg", Method::Original, None, Person::P1),
            rec("b.jpg", Method::Blur, Some(50), Person::P1),
            rec("m.jpg", Method::Mask, None, Person::P1),
            rec("p.jpg", Method::Pixel, Some(50), Person::P1),
        ])
        .unwrap();
        assert_eq!(index.next_method(Method::Blur), Method::Mask);
        assert_eq!(index.next_method(Method::Mask), Method::Pixel);
        assert_eq!(index.next_method(Method::Pixel), Method::Blur);
    }

    #[test]
    fn test_single_method_cycles_to_itself() {
        let index = CatalogIndex::new(vec![
            rec("o.jpg", Method::Original, None, Person::P1),
            rec("b.jpg", Method::Blur, Some(50), Person::P1),
        ])
        .unwrap();
        assert_eq!(index.next_method(Method::Blur), Method::Blur);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(
            CatalogIndex::new(Vec::new()),
            Err(QuizError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_no_references_rejected() {
        let err = CatalogIndex::new(vec![rec("b.jpg", Method::Blur, Some(50), Person::P1)])
            .unwrap_err();
        assert!(matches!(err, QuizError::NoReferenceImages));
    }

    #[test]
    fn test_no_methods_rejected() {
        let err = CatalogIndex::new(vec![rec("o.jpg", Method::Original, None, Person::P1)])
            .unwrap_err();
        assert!(matches!(err, QuizError::NoMethods));
    }

    #[test]
    fn test_coverage_gaps() {
        let index = CatalogIndex::new(vec![
            rec("o.jpg", Method::Original, None, Person::P1),
            rec("b1.jpg", Method::Blur, Some(50), Person::P1),
            rec("b2.jpg", Method::Blur, Some(50), Person::P2),
            rec("m1.jpg", Method::Mask, None, Person::P1),
        ])
        .unwrap();
        let gaps = index.coverage_gaps(&[Person::P1, Person::P2]);
        assert_eq!(gaps, vec![(Method::Mask, Person::P2)]);
    }

    #[test]
    fn test_intensities_sorted_unique() {
        let index = CatalogIndex::new(vec![
            rec("o.jpg", Method::Original, None, Person::P1),
            rec("a.jpg", Method::Blur, Some(75), Person::P1),
            rec("b.jpg", Method::Pixel, Some(50), Person::P1),
            rec("c.jpg", Method::Blur, Some(50), Person::P2),
            rec("d.jpg", Method::Mask, None, Person::P2),
        ])
        .unwrap();
        assert_eq!(index.intensities(), vec![50, 75]);
    }

    #[test]
    fn test_parse_json_document() {
        let json = r#"{ "images": [
            { "file": "p1.jpg", "method": "original", "person": "P1" },
            { "file": "p1_b50.jpg", "method": "blur", "intensity": 50, "person": "P1" },
            { "file": "p1_m.jpg", "method": "mask", "person": "P1" }
        ] }"#;
        let index = CatalogIndex::from_json_str(json).unwrap();
        assert_eq!(index.reference_images().len(), 1);
        assert_eq!(index.pool(Method::Blur).unwrap().images[0].intensity, Some(50));
        assert_eq!(index.pool(Method::Mask).unwrap().images[0].intensity, None);
    }

    #[test]
    fn test_corrupt_json_is_configuration_error() {
        let err = CatalogIndex::from_json_str("{ images: ").unwrap_err();
        assert!(matches!(err, QuizError::Json(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_person_rejected() {
        let json = r#"{ "images": [ { "file": "x.jpg", "method": "original", "person": "P9" } ] }"#;
        assert!(CatalogIndex::from_json_str(json).is_err());
    }

    #[test]
    fn test_missing_file_names_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nope.json");
        let err = CatalogIndex::from_path(&path).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"images":[{"file":"a.jpg","method":"original","person":"P4"},
                          {"file":"b.jpg","method":"pixel","intensity":75,"person":"P4"}]}"#,
        )
        .unwrap();
        let index = CatalogIndex::from_path(&path).unwrap();
        assert_eq!(index.reference_images()[0].person, Person::P4);
        assert_eq!(index.first_method(), Method::Pixel);
    }

    #[test]
    fn test_display_path() {
        let root = Path::new("images");
        let original = rec("p1.jpg", Method::Original, None, Person::P1);
        let blurred = rec("p1_b.jpg", Method::Blur, Some(50), Person::P1);
        assert_eq!(original.display_path(root), PathBuf::from("images/original/p1.jpg"));
        assert_eq!(blurred.display_path(root), PathBuf::from("images/blur/p1_b.jpg"));
    }

    #[test]
    fn test_person_display() {
        let names: Vec<String> = Person::ALL.iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["P1", "P2", "P3", "P4", "P5", "P6", "P7", "P8"]);
    }
}

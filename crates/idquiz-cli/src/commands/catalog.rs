//! `idquiz catalog`: show what a catalog contains and whether it can run.

use idquiz_core::{CatalogIndex, Method, Person};

pub fn run(catalog_path: &str) {
    let index = super::load_catalog(catalog_path);
    print!("{}", summarize(&index));

    if !index.coverage_gaps(&Person::ALL).is_empty() {
        std::process::exit(1);
    }
}

/// Human-readable summary: reference count, one line per method pool, and
/// any identity a pool is missing.
pub fn summarize(index: &CatalogIndex) -> String {
    let mut out = String::new();
    let refs = index.reference_images();
    out.push_str(&format!("Reference images: {}\n", refs.len()));
    let order: Vec<String> = refs.iter().map(|r| r.person.to_string()).collect();
    out.push_str(&format!("  Trial order: {}\n", order.join(" ")));

    out.push_str("\nMethods (round-robin order):\n");
    for pool in index.processed_by_method() {
        let mut intensities: Vec<u32> = pool.images.iter().filter_map(|i| i.intensity).collect();
        intensities.sort_unstable();
        intensities.dedup();
        let strengths = if pool.method == Method::Mask || intensities.is_empty() {
            "-".to_string()
        } else {
            intensities
                .iter()
                .map(|i| format!("{i}%"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push_str(&format!(
            "  {:<8} {:>4} images   intensities: {}\n",
            pool.method.to_string(),
            pool.images.len(),
            strengths
        ));
    }

    let gaps = index.coverage_gaps(&Person::ALL);
    if gaps.is_empty() {
        out.push_str("\nCoverage: every method has every identity.\n");
    } else {
        out.push_str("\nCoverage gaps (quiz cannot start):\n");
        for (method, person) in gaps {
            out.push_str(&format!("  {method}: no image of {person}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use idquiz_core::AssetRecord;

    use super::*;

    fn record(file: &str, method: Method, intensity: Option<u32>, person: Person) -> AssetRecord {
        AssetRecord {
            file: file.to_string(),
            method,
            intensity,
            person,
        }
    }

    #[test]
    fn test_summary_lists_pools_and_gaps() {
        let mut records = vec![
            record("p2.jpg", Method::Original, None, Person::P2),
            record("p1.jpg", Method::Original, None, Person::P1),
        ];
        for person in Person::ALL {
            records.push(record("b50.jpg", Method::Blur, Some(50), person));
            records.push(record("b75.jpg", Method::Blur, Some(75), person));
        }
        records.push(record("m.jpg", Method::Mask, None, Person::P1));

        let text = summarize(&CatalogIndex::new(records).unwrap());
        assert!(text.contains("Reference images: 2"));
        assert!(text.contains("Trial order: P2 P1"));
        assert!(text.contains("intensities: 50%, 75%"));
        assert!(text.contains("Coverage gaps"));
        assert!(text.contains("mask: no image of P2"));
        assert!(!text.contains("blur: no image"));
    }

    #[test]
    fn test_summary_full_coverage() {
        let mut records = vec![record("p1.jpg", Method::Original, None, Person::P1)];
        for person in Person::ALL {
            records.push(record("m.jpg", Method::Mask, None, person));
        }
        let text = summarize(&CatalogIndex::new(records).unwrap());
        assert!(text.contains("every method has every identity"));
    }
}

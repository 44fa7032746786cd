//! Quicksort over loose version strings.

use baseline_version::LooseVersion;

/// Split `data` around `pivot` into less, equal and greater buckets.
fn partition(data: Vec<String>, pivot: &LooseVersion) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut less = Vec::new();
    let mut equal = Vec::new();
    let mut greater = Vec::new();
    for version in data {
        match LooseVersion::new(&version).cmp(pivot) {
            std::cmp::Ordering::Less => less.push(version),
            std::cmp::Ordering::Equal => equal.push(version),
            std::cmp::Ordering::Greater => greater.push(version),
        }
    }
    (less, equal, greater)
}

/// Sort version strings oldest first.
pub fn quicksort_versions(data: Vec<String>) -> Vec<String> {
    if data.len() <= 1 {
        return data;
    }
    let pivot = LooseVersion::new(&data[0]);
    let (less, equal, greater) = partition(data, &pivot);

    let mut sorted = quicksort_versions(less);
    sorted.extend(equal);
    sorted.extend(quicksort_versions(greater));
    sorted
}

/// A response definition document benchmarked under a size class.
#[derive(Debug, Copy, Clone)]
pub struct BenchCase {
    name: &'static str,
    size: BenchSize,
    json: &'static str,
}

impl BenchCase {
    pub const fn new(name: &'static str, size: BenchSize, json: &'static str) -> Self {
        Self { name, size, json }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn size(&self) -> BenchSize {
        self.size
    }

    pub fn json(&self) -> &'static str {
        self.json
    }
}

/// Size classes get their own criterion groups, so small documents aren't compared against
/// payloads a hundred times larger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BenchSize {
    Small,
    Large,
}

impl BenchSize {
    pub const ALL: [BenchSize; 2] = [BenchSize::Small, BenchSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            BenchSize::Small => "small",
            BenchSize::Large => "large",
        }
    }
}

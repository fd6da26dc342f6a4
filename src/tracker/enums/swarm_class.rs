use std::fmt;

/// Which membership set of a swarm a peer belongs to.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum SwarmClass {
    Seeders,
    Leechers,
}

impl SwarmClass {
    /// Key suffix of the membership set, doubling as the name of the
    /// aggregate counter field this class maintains.
    pub fn key_suffix(&self) -> &'static str {
        match self {
            SwarmClass::Seeders => "seeders",
            SwarmClass::Leechers => "leechers",
        }
    }
}

impl fmt::Display for SwarmClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key_suffix())
    }
}

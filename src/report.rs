use crate::source::Tier;

use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NorthSouth {
    North,
    South,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EastWest {
    East,
    West,
}

/// Absolute degrees paired with the hemisphere of the signed value they came from.
///
/// The only constructor takes the signed value, so label and magnitude cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate<H> {
    hemisphere: H,
    degrees: f64,
}

pub type Latitude = Coordinate<NorthSouth>;
pub type Longitude = Coordinate<EastWest>;

impl<H: Copy> Coordinate<H> {
    pub fn hemisphere(&self) -> H {
        self.hemisphere
    }

    /// Always non-negative.
    pub fn degrees(&self) -> f64 {
        self.degrees
    }
}

impl Latitude {
    /// `None` for NaN and infinities.
    pub fn from_signed(value: f64) -> Option<Self> {
        value.is_finite().then(|| Self {
            hemisphere: if value >= 0.0 {
                NorthSouth::North
            } else {
                NorthSouth::South
            },
            degrees: value.abs(),
        })
    }
}

impl Longitude {
    /// `None` for NaN and infinities.
    pub fn from_signed(value: f64) -> Option<Self> {
        value.is_finite().then(|| Self {
            hemisphere: if value >= 0.0 {
                EastWest::East
            } else {
                EastWest::West
            },
            degrees: value.abs(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkTag {
    Cellular,
    ProxyVpn,
    Datacenter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkType {
    /// At least one flag was set, in cellular, proxy/VPN, datacenter order.
    Tagged(SmallVec<[NetworkTag; 3]>),
    /// The source exposes flags but none was set.
    Residential,
    /// The source does not expose network flags at all.
    Unavailable,
}

impl NetworkType {
    /// Builds from the three provider flags, in fixed tag order.
    pub fn from_flags(cellular: bool, proxy_vpn: bool, datacenter: bool) -> Self {
        let tags: SmallVec<[NetworkTag; 3]> = [
            (cellular, NetworkTag::Cellular),
            (proxy_vpn, NetworkTag::ProxyVpn),
            (datacenter, NetworkTag::Datacenter),
        ]
        .into_iter()
        .filter_map(|(flag, tag)| flag.then_some(tag))
        .collect();
        if tags.is_empty() {
            Self::Residential
        } else {
            Self::Tagged(tags)
        }
    }
}

/// Provider-independent lookup result.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalReport {
    pub source: String,
    pub tier: Tier,
    pub query: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub continent: Option<String>,
    pub isp: Option<String>,
    pub org: Option<String>,
    pub as_number: Option<String>,
    pub timezone: Option<String>,
    pub latitude: Option<Latitude>,
    pub longitude: Option<Longitude>,
    pub network_type: NetworkType,
}

//! IPv4 CIDR blocks used for address spaces and subnet prefixes.

use serde::Serialize;
use std::error::Error;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use azure_nsg_provision::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, Box<dyn Error>> {
    if len > MAX_LENGTH {
        Err("Network length is too long".into())
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;

        let mask = (all_bits >> right_len) << right_len;

        Ok(mask as u32)
    }
}

/// An IPv4 block such as `192.168.1.0/24`.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Cidr {
    pub addr: Ipv4Addr,
    pub mask: u8,
}

impl Cidr {
    /// Parse a CIDR string (e.g. "10.0.0.0/24").
    pub fn new(addr_cidr: &str) -> Result<Cidr, Box<dyn Error>> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| format!("Invalid address/mask: {addr_cidr}"))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| format!("Invalid address {addr}"))?;
        let mask: u8 = mask
            .parse()
            .map_err(|_| format!("Invalid subnet mask {mask}"))?;
        if mask > MAX_LENGTH {
            return Err("Network length is too long".into());
        }
        Ok(Cidr { addr, mask })
    }

    /// Lowest (network) address in the block.
    pub fn lo(&self) -> Ipv4Addr {
        let mask = get_cidr_mask(self.mask).unwrap_or(u32::MAX);
        Ipv4Addr::from(u32::from(self.addr) & mask)
    }

    /// Highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        let mask = get_cidr_mask(self.mask).unwrap_or(u32::MAX);
        Ipv4Addr::from((u32::from(self.addr) & mask) | !mask)
    }

    /// True when `other` lies entirely inside this block.
    pub fn contains(&self, other: &Cidr) -> bool {
        self.lo() <= other.lo() && other.hi() <= self.hi()
    }

    /// True when the two blocks share at least one address.
    pub fn overlaps(&self, other: &Cidr) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }
}

impl FromStr for Cidr {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cidr::new(s)
    }
}

impl std::fmt::Display for Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

impl Serialize for Cidr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

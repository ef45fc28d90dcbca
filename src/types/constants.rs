use std::net::Ipv4Addr;

/// Largest node count the simulated topology can address on its /24 station subnet
pub const DEFAULT_MAX_NODES: u32 = 250;

/// Column delimiter of the tabular report
pub const REPORT_DELIMITER: char = ';';

/// Label of the dispersion column that follows every value column
pub const DISPERSION_COLUMN: &str = "dp";

/// Address of the server node behind the point-to-point link
pub fn server_address() -> Ipv4Addr {
    Ipv4Addr::new(10, 0, 0, 2)
}

/// Address of the n-th wireless station (0-based), after the access point at .1
pub fn station_address(station: u32) -> Ipv4Addr {
    let host = station + 2;
    Ipv4Addr::new(192, 168, (host / 256) as u8, (host % 256) as u8)
}

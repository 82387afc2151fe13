use std::net::{IpAddr, Ipv4Addr};

pub const LOCAL_HOST: IpAddr = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));

//! macOS commands for the BSD networking tools and `networksetup`.

use std::net::IpAddr;

use crate::command::PlatformCommand;

pub fn set_dns(service: &str, dns: IpAddr) -> PlatformCommand {
    PlatformCommand::new("networksetup")
        .arg("-setdnsservers")
        .arg(service)
        .arg(dns.to_string())
}

/// Removes manually configured DNS servers so the service falls back to DHCP.
pub fn clear_dns(service: &str) -> PlatformCommand {
    PlatformCommand::new("networksetup")
        .arg("-setdnsservers")
        .arg(service)
        .arg("empty")
}

pub fn flush_directory_cache() -> PlatformCommand {
    PlatformCommand::new("sudo").args(["dscacheutil", "-flushcache"])
}

pub fn reload_mdns_responder() -> PlatformCommand {
    PlatformCommand::new("sudo").args(["killall", "-HUP", "mDNSResponder"])
}

pub fn route_get_default() -> PlatformCommand {
    PlatformCommand::new("route").args(["-n", "get", "default"])
}

pub fn add_default_route(gateway: IpAddr) -> PlatformCommand {
    PlatformCommand::new("sudo")
        .args(["route", "add", "default"])
        .arg(gateway.to_string())
}

pub fn add_host_route(destination: IpAddr, gateway: IpAddr) -> PlatformCommand {
    let cmd = PlatformCommand::new("sudo").args(["route", "add"]);
    let cmd = if destination.is_ipv6() { cmd.arg("-inet6") } else { cmd };
    cmd.arg("-host")
        .arg(destination.to_string())
        .arg(gateway.to_string())
}

pub fn delete_host_route(destination: IpAddr) -> PlatformCommand {
    let cmd = PlatformCommand::new("sudo").args(["route", "-n", "delete"]);
    let cmd = if destination.is_ipv6() { cmd.arg("-inet6") } else { cmd };
    cmd.arg("-host").arg(destination.to_string())
}

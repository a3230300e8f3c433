//! Linux commands for iproute2, systemd-resolved and NetworkManager.

use std::net::IpAddr;

use crate::command::PlatformCommand;

/// Destination used to ask the kernel which interface carries default traffic.
pub const PROBE_DESTINATION: &str = "8.8.8.8";

/// Tools able to set a per-interface DNS server, in preference order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DnsManager {
    Resolvectl,
    Nmcli,
}

impl DnsManager {
    pub const CANDIDATES: [DnsManager; 2] = [DnsManager::Resolvectl, DnsManager::Nmcli];

    pub fn program(self) -> &'static str {
        match self {
            DnsManager::Resolvectl => "resolvectl",
            DnsManager::Nmcli => "nmcli",
        }
    }
}

/// Tools able to drop the resolver cache, in preference order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushTool {
    Resolvectl,
    SystemdResolve,
}

impl FlushTool {
    pub const CANDIDATES: [FlushTool; 2] = [FlushTool::Resolvectl, FlushTool::SystemdResolve];

    pub fn program(self) -> &'static str {
        match self {
            FlushTool::Resolvectl => "resolvectl",
            FlushTool::SystemdResolve => "systemd-resolve",
        }
    }
}

pub fn set_dns(manager: DnsManager, interface: &str, dns: IpAddr) -> PlatformCommand {
    match manager {
        DnsManager::Resolvectl => PlatformCommand::new("resolvectl")
            .arg("dns")
            .arg(interface)
            .arg(dns.to_string()),
        DnsManager::Nmcli => {
            let family = if dns.is_ipv4() { "ipv4" } else { "ipv6" };
            PlatformCommand::new("nmcli")
                .args(["connection", "modify", interface])
                .arg(format!("{family}.dns"))
                .arg(dns.to_string())
                .arg(format!("{family}.ignore-auto-dns"))
                .arg("yes")
        }
    }
}

/// Re-activates the connection profile so a modified DNS setting takes effect.
pub fn connection_up(interface: &str) -> PlatformCommand {
    PlatformCommand::new("nmcli").args(["connection", "up", interface])
}

pub fn flush_dns(tool: FlushTool) -> PlatformCommand {
    match tool {
        FlushTool::Resolvectl => PlatformCommand::new("resolvectl").arg("flush-caches"),
        FlushTool::SystemdResolve => PlatformCommand::new("systemd-resolve").arg("--flush-caches"),
    }
}

pub fn link_down(interface: &str) -> PlatformCommand {
    PlatformCommand::new("ip").args(["link", "set", interface, "down"])
}

pub fn link_up(interface: &str) -> PlatformCommand {
    PlatformCommand::new("ip").args(["link", "set", interface, "up"])
}

pub fn route_get_probe() -> PlatformCommand {
    PlatformCommand::new("ip").args(["route", "get", PROBE_DESTINATION])
}

pub fn add_host_route(destination: IpAddr, gateway: IpAddr) -> PlatformCommand {
    PlatformCommand::new("ip")
        .args(["route", "add"])
        .arg(destination.to_string())
        .arg("via")
        .arg(gateway.to_string())
}

pub fn delete_host_route(destination: IpAddr, gateway: IpAddr) -> PlatformCommand {
    PlatformCommand::new("sudo")
        .args(["ip", "route", "del"])
        .arg(destination.to_string())
        .arg("via")
        .arg(gateway.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn set_dns_with_resolvectl() {
        assert_eq!(
            set_dns(DnsManager::Resolvectl, "eth0", ip("1.1.1.1")).to_string(),
            "resolvectl dns eth0 1.1.1.1"
        );
    }

    #[test]
    fn set_dns_with_nmcli_ignores_auto_dns() {
        assert_eq!(
            set_dns(DnsManager::Nmcli, "eth0", ip("1.1.1.1")).to_string(),
            "nmcli connection modify eth0 ipv4.dns 1.1.1.1 ipv4.ignore-auto-dns yes"
        );
        assert_eq!(
            set_dns(DnsManager::Nmcli, "eth0", ip("2606:4700:4700::1111")).to_string(),
            "nmcli connection modify eth0 ipv6.dns 2606:4700:4700::1111 ipv6.ignore-auto-dns yes"
        );
    }

    #[test]
    fn connection_up_reactivates_profile() {
        assert_eq!(connection_up("eth0").to_string(), "nmcli connection up eth0");
    }

    #[test]
    fn flush_commands() {
        assert_eq!(flush_dns(FlushTool::Resolvectl).to_string(), "resolvectl flush-caches");
        assert_eq!(
            flush_dns(FlushTool::SystemdResolve).to_string(),
            "systemd-resolve --flush-caches"
        );
    }

    #[test]
    fn link_toggle_keeps_alias_as_single_argument() {
        let down = link_down("eth0 && reboot");
        assert_eq!(down.program(), "ip");
        assert_eq!(down.arguments(), ["link", "set", "eth0 && reboot", "down"]);
        assert_eq!(link_up("eth0").to_string(), "ip link set eth0 up");
    }

    #[test]
    fn route_commands() {
        assert_eq!(route_get_probe().to_string(), "ip route get 8.8.8.8");
        assert_eq!(
            add_host_route(ip("35.213.7.172"), ip("192.168.88.1")).to_string(),
            "ip route add 35.213.7.172 via 192.168.88.1"
        );
        assert_eq!(
            delete_host_route(ip("35.213.7.172"), ip("192.168.88.1")).to_string(),
            "sudo ip route del 35.213.7.172 via 192.168.88.1"
        );
    }
}

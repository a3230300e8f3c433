//! Windows commands, all run through PowerShell.

use std::net::{IpAddr, Ipv4Addr};

use crate::command::PlatformCommand;

const POWERSHELL: &str = "powershell";

const DEFAULT_GATEWAY_SCRIPT: &str = "Get-NetRoute -DestinationPrefix \"0.0.0.0/0\" | Where-Object { $_.NextHop -ne '0.0.0.0' -and $_.NextHop -ne '::' } | Sort-Object { $_.RouteMetric + $_.InterfaceMetric } | Select-Object -ExpandProperty NextHop -First 1";

const DEFAULT_INTERFACE_SCRIPT: &str = "Get-NetRoute -DestinationPrefix \"0.0.0.0/0\" | Where-Object { $_.NextHop -ne '0.0.0.0' -and $_.NextHop -ne '::' } | Sort-Object { $_.RouteMetric + $_.InterfaceMetric } | Select-Object -ExpandProperty InterfaceAlias -First 1";

const HOST_MASK: &str = "255.255.255.255";

fn powershell(script: impl Into<String>) -> PlatformCommand {
    PlatformCommand::new(POWERSHELL).arg("-Command").arg(script)
}

/// Quotes `value` as a PowerShell single-quoted string literal.
///
/// Single-quoted strings are never expanded; the only special characters are
/// the quote marks themselves (PowerShell also accepts the typographic
/// variants), which are escaped by doubling.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}') {
            quoted.push(c);
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

pub fn set_dns(interface: &str, dns: IpAddr) -> PlatformCommand {
    powershell(format!(
        "Set-DnsClientServerAddress -InterfaceAlias {} -ServerAddresses {}",
        quote(interface),
        quote(&dns.to_string())
    ))
}

pub fn flush_dns() -> PlatformCommand {
    powershell("Clear-DnsClientCache")
}

pub fn restart_adapter(interface: &str) -> PlatformCommand {
    powershell(format!("Restart-NetAdapter -Name {} -Confirm:$false", quote(interface)))
}

pub fn default_gateway() -> PlatformCommand {
    PlatformCommand::new("powershell.exe")
        .arg("-Command")
        .arg(DEFAULT_GATEWAY_SCRIPT)
}

pub fn default_interface() -> PlatformCommand {
    powershell(DEFAULT_INTERFACE_SCRIPT)
}

pub fn add_host_route(destination: Ipv4Addr, gateway: Ipv4Addr) -> PlatformCommand {
    powershell(format!("route add {destination} mask {HOST_MASK} {gateway}"))
}

pub fn delete_host_route(destination: Ipv4Addr) -> PlatformCommand {
    powershell(format!("route delete {destination} mask {HOST_MASK}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(cmd: &PlatformCommand) -> Vec<&str> {
        std::iter::once(cmd.program())
            .chain(cmd.arguments().iter().map(String::as_str))
            .collect()
    }

    #[test]
    fn set_dns_uses_literal_alias() {
        assert_eq!(
            argv(&set_dns("Ethernet 2", IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)))),
            vec![
                "powershell",
                "-Command",
                "Set-DnsClientServerAddress -InterfaceAlias 'Ethernet 2' -ServerAddresses '1.1.1.1'"
            ]
        );
    }

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(quote("it's"), "'it''s'");
        assert_eq!(quote("a\u{2019}b"), "'a\u{2019}\u{2019}b'");
        assert_eq!(quote("$(Stop-Computer)"), "'$(Stop-Computer)'");
    }

    #[test]
    fn flush_dns_clears_client_cache() {
        assert_eq!(argv(&flush_dns()), vec!["powershell", "-Command", "Clear-DnsClientCache"]);
    }

    #[test]
    fn restart_adapter_skips_confirmation() {
        assert_eq!(
            argv(&restart_adapter("Wi-Fi")),
            vec!["powershell", "-Command", "Restart-NetAdapter -Name 'Wi-Fi' -Confirm:$false"]
        );
    }

    #[test]
    fn queries_select_best_default_route() {
        let gateway = default_gateway();
        assert_eq!(gateway.program(), "powershell.exe");
        assert!(gateway.arguments()[1].ends_with("Select-Object -ExpandProperty NextHop -First 1"));

        let interface = default_interface();
        assert_eq!(interface.program(), "powershell");
        assert!(interface.arguments()[1].ends_with("Select-Object -ExpandProperty InterfaceAlias -First 1"));
    }

    #[test]
    fn host_routes_use_full_mask() {
        let dest = Ipv4Addr::new(35, 213, 7, 172);
        let gw = Ipv4Addr::new(192, 168, 88, 1);
        assert_eq!(
            argv(&add_host_route(dest, gw)),
            vec!["powershell", "-Command", "route add 35.213.7.172 mask 255.255.255.255 192.168.88.1"]
        );
        assert_eq!(
            argv(&delete_host_route(dest)),
            vec!["powershell", "-Command", "route delete 35.213.7.172 mask 255.255.255.255"]
        );
    }
}

//! Daemon config templates
//!
//! Every placeholder is filled from the derived subnet parameters plus
//! the domain and service account; `template::render` refuses to emit a
//! file with an unresolved placeholder.

use std::collections::BTreeMap;

use labhost_net::NetworkParameters;

/// isc-dhcp-server subnet declaration
pub const DHCPD_CONF: &str = r#"# Lab DHCP configuration (generated; edits are preserved on re-runs)
option domain-name "{{domain}}";
option domain-name-servers {{gateway}};

default-lease-time 600;
max-lease-time 7200;
authoritative;

subnet {{network}} netmask {{netmask}} {
  range {{range_start}} {{range_end}};
  option routers {{gateway}};
  option broadcast-address {{broadcast}};
}
"#;

/// bind9 zone declarations, dropped next to named.conf for inclusion
pub const NAMED_CONF_LAB: &str = r#"// Lab zones (generated; edits are preserved on re-runs)
zone "{{domain}}" {
    type master;
    file "{{bind_dir}}/db.{{domain}}";
};

zone "{{reverse_zone}}" {
    type master;
    file "{{bind_dir}}/db.{{reverse_zone}}";
};
"#;

/// Forward zone: the gateway answers for the lab domain
pub const FORWARD_ZONE: &str = r#"$TTL    604800
@       IN      SOA     {{domain}}. admin.{{domain}}. (
                              2         ; Serial
                         604800         ; Refresh
                          86400         ; Retry
                        2419200         ; Expire
                         604800 )       ; Negative Cache TTL
@       IN      NS      {{domain}}.
@       IN      A       {{gateway}}
gw      IN      A       {{gateway}}
"#;

/// Reverse zone for the /24
pub const REVERSE_ZONE: &str = r#"$TTL    604800
@       IN      SOA     {{domain}}. admin.{{domain}}. (
                              2         ; Serial
                         604800         ; Refresh
                          86400         ; Retry
                        2419200         ; Expire
                         604800 )       ; Negative Cache TTL
@       IN      NS      {{domain}}.
1       IN      PTR     gw.{{domain}}.
"#;

/// dnsmasq profile: DHCP and local DNS from one drop-in
pub const DNSMASQ_CONF: &str = r#"# Lab network on {{cidr}} (generated; edits are preserved on re-runs)
domain={{domain}}
local=/{{domain}}/
listen-address={{gateway}}
dhcp-range={{range_start}},{{range_end}},12h
dhcp-option=option:router,{{gateway}}
dhcp-option=option:dns-server,{{gateway}}
"#;

/// bird OSPF config exporting the lab subnet into area 0
pub const BIRD_CONF: &str = r#"# Lab OSPF configuration (generated; edits are preserved on re-runs)
router id {{gateway}};

protocol device {
}

protocol direct {
    ipv4;
}

protocol kernel {
    ipv4 {
        export all;
    };
}

protocol ospf v2 lab {
    ipv4 {
        export all;
    };
    area 0 {
        interface "*" {
        };
    };
}
"#;

/// systemd unit running the GNS3 server as the service account
pub const GNS3_UNIT: &str = r#"[Unit]
Description=GNS3 server
After=network.target

[Service]
User={{user}}
Group={{user}}
ExecStart=/usr/bin/gns3server --local
Restart=on-failure
RestartSec=5

[Install]
WantedBy=multi-user.target
"#;

/// Parameter map shared by all templates
#[must_use]
pub fn template_params(
    net: &NetworkParameters,
    domain: &str,
    service_user: &str,
    bind_dir: &std::path::Path,
) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("network".to_string(), net.network.to_string()),
        ("netmask".to_string(), net.netmask().to_string()),
        ("cidr".to_string(), net.cidr()),
        ("gateway".to_string(), net.gateway.to_string()),
        ("broadcast".to_string(), net.broadcast.to_string()),
        ("range_start".to_string(), net.dhcp_range_start.to_string()),
        ("range_end".to_string(), net.dhcp_range_end.to_string()),
        ("reverse_zone".to_string(), net.reverse_zone()),
        ("domain".to_string(), domain.to_string()),
        ("user".to_string(), service_user.to_string()),
        ("bind_dir".to_string(), bind_dir.display().to_string()),
    ])
}

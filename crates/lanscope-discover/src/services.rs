//! Static port to service-name table.
//!
//! Names follow the IANA / `/etc/services` registry where one exists.

use lanscope_core::types::UNKNOWN_SERVICE;

const SERVICES: &[(u16, &str)] = &[
    (7, "echo"),
    (9, "discard"),
    (13, "daytime"),
    (19, "chargen"),
    (20, "ftp-data"),
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (37, "time"),
    (43, "whois"),
    (49, "tacacs"),
    (53, "domain"),
    (67, "bootps"),
    (68, "bootpc"),
    (69, "tftp"),
    (70, "gopher"),
    (79, "finger"),
    (80, "http"),
    (81, "hosts2-ns"),
    (88, "kerberos"),
    (102, "iso-tsap"),
    (110, "pop3"),
    (111, "sunrpc"),
    (113, "auth"),
    (119, "nntp"),
    (123, "ntp"),
    (135, "epmap"),
    (137, "netbios-ns"),
    (138, "netbios-dgm"),
    (139, "netbios-ssn"),
    (143, "imap"),
    (161, "snmp"),
    (162, "snmp-trap"),
    (179, "bgp"),
    (194, "irc"),
    (389, "ldap"),
    (427, "svrloc"),
    (443, "https"),
    (444, "snpp"),
    (445, "microsoft-ds"),
    (464, "kpasswd"),
    (465, "submissions"),
    (497, "retrospect"),
    (500, "isakmp"),
    (512, "exec"),
    (513, "login"),
    (514, "shell"),
    (515, "printer"),
    (520, "efs"),
    (548, "afpovertcp"),
    (554, "rtsp"),
    (587, "submission"),
    (631, "ipp"),
    (636, "ldaps"),
    (646, "ldp"),
    (873, "rsync"),
    (902, "ideafarm-door"),
    (989, "ftps-data"),
    (990, "ftps"),
    (993, "imaps"),
    (995, "pop3s"),
    (1025, "blackjack"),
    (1433, "ms-sql-s"),
    (1521, "ncube-lm"),
    (1723, "pptp"),
    (1883, "mqtt"),
    (1900, "ssdp"),
    (2049, "nfs"),
    (3000, "hbci"),
    (3306, "mysql"),
    (3389, "ms-wbt-server"),
    (5000, "commplex-main"),
    (5060, "sip"),
    (5353, "mdns"),
    (5432, "postgresql"),
    (5631, "pcanywheredata"),
    (5683, "coap"),
    (5900, "rfb"),
    (5901, "vnc-1"),
    (6379, "redis"),
    (8000, "irdmi"),
    (8008, "http-alt"),
    (8080, "http-alt"),
    (8081, "sunproxyadmin"),
    (8123, "polipo"),
    (8443, "pcsync-https"),
    (8888, "ddi-tcp-1"),
    (9000, "cslistener"),
    (9100, "jetdirect"),
    (9200, "wap-wsp"),
    (25565, "minecraft"),
    (27015, "srcds"),
    (27017, "mongodb"),
];

/// Best-effort service name for a TCP port, or `"unknown"`.
pub fn service_name(port: u16) -> &'static str {
    SERVICES
        .binary_search_by_key(&port, |(p, _)| *p)
        .map(|i| SERVICES[i].1)
        .unwrap_or(UNKNOWN_SERVICE)
}

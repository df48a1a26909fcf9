use crate::models::{BlockList, Device, PageSnapshot};

pub fn render_page(snapshot: &PageSnapshot) -> String {
    if snapshot.devices.is_empty() {
        return "no devices\n".to_string();
    }
    render_devices(&snapshot.devices)
}

/// Plain-text device table, sorted by name.
pub fn render_devices(devices: &[Device]) -> String {
    let mut rows: Vec<&Device> = devices.iter().collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    let name_width = column_width(rows.iter().map(|d| d.name.as_str()), NAME_HEADER);
    let ip_width = column_width(rows.iter().map(|d| d.ip.as_str()), IP_HEADER);

    let mut out = format!("{NAME_HEADER:<name_width$}  {IP_HEADER:<ip_width$}  {UNTIL_HEADER}\n");
    for device in rows {
        out.push_str(&format!(
            "{:<name_width$}  {:<ip_width$}  {}\n",
            device.name,
            device.ip,
            device.active_until_label(),
        ));
    }
    out
}

pub fn render_block_list(list: &BlockList) -> String {
    let mut out = format!("good until: {}\n", list.good_until_label());
    if list.blocked.is_empty() {
        out.push_str("nothing blocked\n");
    }
    for ip in &list.blocked {
        out.push_str(&format!("blocked  {ip}\n"));
    }
    out
}

const NAME_HEADER: &str = "NAME";
const IP_HEADER: &str = "IP";
const UNTIL_HEADER: &str = "ACTIVE UNTIL";

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|value| value.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0)
}

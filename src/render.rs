use crate::report::{CanonicalReport, EastWest, Latitude, Longitude, NetworkTag, NetworkType, NorthSouth};
use crate::resolver::LookupOutcome;
use crate::source::Tier;

/// Shown instead of a report when no source answered.
pub const FAILURE_MESSAGE: &str =
    "❌ 查询失败：所有接口均无法连接，请检查格式或稍后重试，也可能是该 IP 被接口屏蔽。";

/// Shown in place of an absent field.
pub const PLACEHOLDER: &str = "-";

const SEPARATOR: &str = "------------------";

pub fn render(outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::Success(report) => render_report(report),
        LookupOutcome::AllSourcesFailed => FAILURE_MESSAGE.to_owned(),
    }
}

fn render_report(report: &CanonicalReport) -> String {
    let tier: &'static str = report.tier.into();
    format!(
        "IP 查询结果 ({tier}：{source}):\n\
         {SEPARATOR}\n\
         查询 IP: {query}\n\
         归属地: {country} - {region} - {city}\n\
         国家\\地区代码: {country_code}\n\
         大陆: {continent}\n\
         运营商: {isp}\n\
         时区: {timezone}\n\
         组织: {org}\n\
         AS号: {as_number}\n\
         坐标: {latitude}, {longitude}\n\
         {network_type}\n\
         {SEPARATOR}",
        source = report.source,
        query = field(&report.query),
        country = field(&report.country),
        region = field(&report.region),
        city = field(&report.city),
        country_code = field(&report.country_code),
        continent = field(&report.continent),
        isp = field(&report.isp),
        timezone = field(&report.timezone),
        org = field(&report.org),
        as_number = field(&report.as_number),
        latitude = report.latitude.map_or_else(|| PLACEHOLDER.to_owned(), latitude),
        longitude = report.longitude.map_or_else(|| PLACEHOLDER.to_owned(), longitude),
        network_type = network_type(&report.network_type),
    )
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(PLACEHOLDER)
}

fn latitude(latitude: Latitude) -> String {
    let label = match latitude.hemisphere() {
        NorthSouth::North => "北纬",
        NorthSouth::South => "南纬",
    };
    format!("{label}{}°", latitude.degrees())
}

fn longitude(longitude: Longitude) -> String {
    let label = match longitude.hemisphere() {
        EastWest::East => "东经",
        EastWest::West => "西经",
    };
    format!("{label}{}°", longitude.degrees())
}

fn network_type(network_type: &NetworkType) -> String {
    match network_type {
        NetworkType::Tagged(tags) => tags
            .iter()
            .map(|tag| -> &'static str { (*tag).into() })
            .collect::<Vec<_>>()
            .join(" \n "),
        NetworkType::Residential => "这个IP可能是家庭宽带或者其他IP".to_owned(),
        NetworkType::Unavailable => "该源不支持查看IP类型".to_owned(),
    }
}

impl From<Tier> for &'static str {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Primary => "主用源",
            Tier::Backup => "备用源",
        }
    }
}

impl From<NetworkTag> for &'static str {
    fn from(tag: NetworkTag) -> Self {
        match tag {
            NetworkTag::Cellular => "这个IP可能是蜂窝移动网络",
            NetworkTag::ProxyVpn => "这个IP可能是代理/VPN IP",
            NetworkTag::Datacenter => "这个IP可能是数据中心/机房IP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::source::{SchemaKind, SourceRegistry};

    fn report_from(schema: SchemaKind, body: &str) -> CanonicalReport {
        let registry = SourceRegistry::default();
        let source = registry.iter().find(|s| s.schema == schema).unwrap();
        normalize(source, body.as_bytes()).unwrap()
    }

    #[test]
    fn primary_report_layout() {
        let report = report_from(
            SchemaKind::A,
            r#"{
                "status": "success",
                "continent": "North America",
                "country": "United States",
                "countryCode": "US",
                "regionName": "Virginia",
                "city": "Ashburn",
                "lat": 39.03,
                "lon": -77.5,
                "timezone": "America/New_York",
                "isp": "Google LLC",
                "org": "Google Public DNS",
                "as": "AS15169 Google LLC",
                "mobile": true,
                "proxy": false,
                "hosting": true,
                "query": "8.8.8.8"
            }"#,
        );
        let expected = "IP 查询结果 (主用源：ip-api.com):\n\
                        ------------------\n\
                        查询 IP: 8.8.8.8\n\
                        归属地: United States - Virginia - Ashburn\n\
                        国家\\地区代码: US\n\
                        大陆: North America\n\
                        运营商: Google LLC\n\
                        时区: America/New_York\n\
                        组织: Google Public DNS\n\
                        AS号: AS15169 Google LLC\n\
                        坐标: 北纬39.03°, 西经77.5°\n\
                        这个IP可能是蜂窝移动网络 \n 这个IP可能是数据中心/机房IP\n\
                        ------------------";
        assert_eq!(render(&LookupOutcome::Success(report)), expected);
    }

    #[test]
    fn backup_report_marks_type_unavailable() {
        let report = report_from(
            SchemaKind::B,
            r#"{"ip": "1.1.1.1", "country_name": "Australia", "latitude": -33.8688, "longitude": 151.2093}"#,
        );
        let text = render(&LookupOutcome::Success(report));
        assert!(text.starts_with("IP 查询结果 (备用源：ipapi.co):\n"));
        assert!(text.contains("归属地: Australia - - - -\n"));
        assert!(text.contains("坐标: 南纬33.8688°, 东经151.2093°\n"));
        assert!(text.contains("\n该源不支持查看IP类型\n"));
        assert!(!text.contains("家庭宽带"));
    }

    #[test]
    fn residential_and_missing_coordinates() {
        let report = report_from(SchemaKind::A, r#"{"query": "192.0.2.1", "lat": 10.5}"#);
        let text = render(&LookupOutcome::Success(report));
        assert!(text.contains("坐标: 北纬10.5°, -\n"));
        assert!(text.contains("\n这个IP可能是家庭宽带或者其他IP\n"));
        assert!(text.contains("AS号: -\n"));
    }

    #[test]
    fn failure_has_no_diagnostics() {
        let text = render(&LookupOutcome::AllSourcesFailed);
        assert_eq!(text, FAILURE_MESSAGE);
        assert!(!text.contains("ip-api.com"));
        assert!(!text.contains("429"));
    }
}

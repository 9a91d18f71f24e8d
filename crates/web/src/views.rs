use maud::{html, Markup, DOCTYPE};
use property_rank_core::{
    adapters::config::dashboard_config::DashboardConfig,
    application::dashboard_service::{RankingPage, UnitDetail},
    domain::{
        format::format_value,
        history::{ComparisonUnavailable, PriceComparison},
        ranking::{RankedRecord, SortOrder, Summary},
    },
    ports::property_source::FetchError,
};
use strum::IntoEnumIterator;

const STYLE: &str = r#"
body { font-family: "Noto Sans KR", "Malgun Gothic", sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; color: #222; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border-bottom: 1px solid #ddd; padding: .35rem .5rem; text-align: left; }
td.num, th.num { text-align: right; font-variant-numeric: tabular-nums; }
form.search { display: flex; gap: .5rem; flex-wrap: wrap; align-items: center; }
.summary { display: flex; gap: 1.5rem; flex-wrap: wrap; }
.summary div { background: #f4f6f8; padding: .5rem .75rem; border-radius: 4px; }
.info { background: #eef6ff; padding: .75rem; border-radius: 4px; }
.error { background: #fdecea; padding: .75rem; border-radius: 4px; }
.disclaimer { color: #555; font-size: .9rem; }
"#;

/// Current search inputs, echoed back into the form.
#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    pub query: String,
    pub sort: SortOrder,
    pub zone: Option<String>,
}

fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="ko" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (maud::PreEscaped(STYLE)) }
            }
            body {
                h1 { a href="/" style="color: inherit; text-decoration: none" { (title) } }
                (body)
            }
        }
    }
}

fn reload_button() -> Markup {
    html! {
        form method="post" action="/reload" {
            button type="submit" { "다시 불러오기" }
        }
    }
}

pub fn fetch_error_message(error: &FetchError) -> &'static str {
    match error {
        FetchError::Authentication => "서비스 계정 인증에 실패했습니다. 인증 정보를 확인하세요.",
        FetchError::PermissionDenied => {
            "서비스 계정에 시트 접근 권한이 없습니다. 시트를 서비스 계정 이메일과 공유했는지 확인하세요."
        }
        FetchError::NotFound => "시트를 찾을 수 없습니다. 시트 ID와 gid를 확인하세요.",
        FetchError::Network => "시트 서버에 연결할 수 없습니다. 잠시 후 다시 시도하세요.",
        FetchError::InsufficientData => "시트에 데이터가 충분하지 않습니다. (헤더 + 데이터 필요)",
        FetchError::Unexpected => "시트를 불러오는 중 알 수 없는 오류가 발생했습니다.",
    }
}

fn comparison_message(reason: &ComparisonUnavailable) -> String {
    match reason {
        ComparisonUnavailable::NoZoneColumn => "구역 정보가 없어 비교할 수 없습니다.".to_string(),
        ComparisonUnavailable::NoBaseYear(year) | ComparisonUnavailable::NoBaseValue(year) => {
            format!("{year}년 가격이 없어서 비교 그래프를 그릴 수 없습니다.")
        }
        ComparisonUnavailable::NoCandidates(_) => "비교할 타구역 데이터가 없습니다.".to_string(),
        ComparisonUnavailable::NoCommonYears => "비교 가능한 연도 데이터가 없습니다.".to_string(),
    }
}

pub fn fetch_error_page(config: &DashboardConfig, error: &FetchError) -> Markup {
    layout(
        &config.title,
        html! {
            div.error {
                p { strong { "데이터를 불러오지 못했습니다." } }
                p { (fetch_error_message(error)) }
                (reload_button())
            }
        },
    )
}

pub fn configuration_error_page(message: &str) -> Markup {
    layout(
        "설정 오류",
        html! {
            div.error {
                p { strong { "대시보드 설정을 불러오지 못했습니다." } }
                pre { (message) }
                p { "설정 파일 또는 PROPERTY_RANK_* 환경 변수를 확인한 뒤 서버를 다시 시작하세요." }
            }
        },
    )
}

fn search_form(form: &SearchForm, page: &RankingPage) -> Markup {
    html! {
        form.search method="get" action="/" {
            input type="search" name="q" value=(form.query) placeholder="구역 / 단지명 / 동 / 호 검색";
            select name="sort" {
                @for order in SortOrder::iter() {
                    option value=(order.to_string()) selected[order == form.sort] { (order.label()) }
                }
            }
            @if !page.zones.is_empty() {
                select name="zone" {
                    option value="" { "전체 구역" }
                    @for zone in &page.zones {
                        option value=(zone) selected[form.zone.as_deref() == Some(zone.as_str())] { (zone) }
                    }
                }
            }
            @if !page.years.is_empty() {
                select name="year" {
                    @for year in page.years.iter().rev() {
                        option value=(year) selected[page.selected_year == Some(*year)] { (year) "년" }
                    }
                }
            }
            button type="submit" { "검색" }
        }
    }
}

fn summary_panel(summary: &Summary, unit: &str) -> Markup {
    let value = |value: Option<f64>| {
        value
            .map(|value| format_value(value, unit))
            .unwrap_or_else(|| "-".to_string())
    };
    html! {
        div.summary {
            div { "결과 " strong { (summary.count) } "건" }
            div { "제외된 행 " strong { (summary.dropped_count) } "건" }
            div { "최고 " strong { (value(summary.top)) } }
            div { "최저 " strong { (value(summary.bottom)) } }
            div { "평균 " strong { (value(summary.mean)) } }
        }
    }
}

/// Detail link that keeps the ranked year selected.
fn unit_href(row_index: usize, year: Option<i32>) -> String {
    match year {
        Some(year) => format!("/unit/{row_index}?year={year}"),
        None => format!("/unit/{row_index}"),
    }
}

fn ranking_table(records: &[RankedRecord], show_zone_rank: bool, year: Option<i32>) -> Markup {
    let show_area = records.iter().any(|ranked| ranked.record.area.is_some());
    let show_year = records.iter().any(|ranked| ranked.record.year.is_some());
    html! {
        table {
            thead {
                tr {
                    th.num { "순위" }
                    th { "단지 / 호" }
                    th.num { "공시가격" }
                    th.num { "전체 순위" }
                    @if show_zone_rank { th.num { "구역 내 순위" } }
                    @if show_area { th.num { "면적" } }
                    @if show_year { th.num { "준공연도" } }
                }
            }
            tbody {
                @for ranked in records {
                    tr {
                        td.num { (ranked.rank) }
                        td { a href=(unit_href(ranked.record.row_index, year)) { (ranked.record.identifier) } }
                        td.num { (ranked.formatted_value) }
                        td.num { (ranked.overall_rank) }
                        @if show_zone_rank {
                            td.num { @if let Some(rank) = ranked.zone_rank { (rank) } @else { "-" } }
                        }
                        @if show_area {
                            td.num { @if let Some(area) = ranked.record.area { (area) } }
                        }
                        @if show_year {
                            td.num { @if let Some(year) = ranked.record.year { (year) } }
                        }
                    }
                }
            }
        }
    }
}

pub fn ranking_page(config: &DashboardConfig, form: &SearchForm, page: &RankingPage) -> Markup {
    let shown = &page.view.records[..page.view.len().min(config.page_size)];
    layout(
        &config.title,
        html! {
            p.disclaimer { (config.disclaimer) }
            (search_form(form, page))
            @if let Some(year) = page.selected_year {
                p { (year) "년 공시가격 기준" }
            }
            (summary_panel(&page.view.summary, &config.value_unit))
            @if page.view.is_empty() {
                p.info {
                    @if form.query.trim().is_empty() {
                        "표시할 데이터가 없습니다."
                    } @else {
                        "'" (form.query.trim()) "'에 해당하는 결과가 없습니다."
                    }
                }
            } @else {
                (ranking_table(shown, !page.zones.is_empty(), page.selected_year))
                @if shown.len() < page.view.len() {
                    p.info { "상위 " (shown.len()) "건만 표시합니다. 검색어로 범위를 좁혀 보세요." }
                }
            }
        },
    )
}

fn comparison_table(
    comparison: &PriceComparison,
    own_zone: Option<&str>,
    year: Option<i32>,
    unit: &str,
) -> Markup {
    html! {
        p {
            (comparison.base_year) "년 가격이 가장 비슷한 타구역 세대: "
            a href=(unit_href(comparison.other_row_index, year)) { (comparison.other_identifier) }
        }
        table {
            thead {
                tr {
                    th { "연도" }
                    th.num { "선택: " (own_zone.unwrap_or("-")) }
                    th.num { "유사타구역: " (comparison.other_zone) }
                }
            }
            tbody {
                @for point in &comparison.points {
                    tr {
                        td { (point.year) }
                        td.num { (format_value(point.selected, unit)) }
                        td.num { (format_value(point.other, unit)) }
                    }
                }
            }
        }
    }
}

pub fn detail_page(config: &DashboardConfig, detail: &UnitDetail) -> Markup {
    let unit = &config.value_unit;
    layout(
        &config.title,
        html! {
            p.disclaimer { (config.disclaimer) }
            h2 { (detail.identifier) }
            p {
                "시트 " (detail.sheet_row.number()) "행"
                @if let Some(record) = &detail.record {
                    " · "
                    @if let Some(year) = detail.value_year { (year) "년 " }
                    "공시가격 " strong { (format_value(record.value, unit)) }
                }
            }

            h3 { "연도별 순위 변화" }
            @if detail.history.is_empty() {
                p.info { "순위 그래프를 그릴 데이터가 없습니다." }
            } @else {
                table {
                    thead {
                        tr {
                            th { "연도" }
                            th.num { "구역 내 순위" }
                            th.num { "전체 순위" }
                        }
                    }
                    tbody {
                        @for entry in &detail.history {
                            tr {
                                td { (entry.year) }
                                td.num { @if let Some(rank) = entry.zone_rank { (rank) } @else { "-" } }
                                td.num { (entry.overall_rank) }
                            }
                        }
                    }
                }
            }

            h3 { "유사 가격 타구역 비교" }
            @match &detail.comparison {
                Ok(comparison) => { (comparison_table(comparison, detail.zone.as_deref(), detail.value_year, unit)) }
                Err(reason) => { p.info { (comparison_message(reason)) } }
            }

            p { a href="/" { "← 목록으로" } }
        },
    )
}

pub fn not_found_page(config: &DashboardConfig) -> Markup {
    layout(
        &config.title,
        html! {
            p.info { "선택한 항목의 데이터가 없습니다." }
            p { a href="/" { "← 목록으로" } }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_fetch_error_has_a_message() {
        for error in [
            FetchError::Authentication,
            FetchError::PermissionDenied,
            FetchError::NotFound,
            FetchError::Network,
            FetchError::InsufficientData,
            FetchError::Unexpected,
        ] {
            assert!(!fetch_error_message(&error).is_empty());
        }
    }

    #[test]
    fn test_error_page_offers_reload() {
        let page = fetch_error_page(&DashboardConfig::default(), &FetchError::PermissionDenied)
            .into_string();
        assert!(page.contains("action=\"/reload\""));
        assert!(page.contains("접근 권한"));
    }

    #[test]
    fn test_unit_href_keeps_year() {
        assert_eq!(unit_href(3, Some(2016)), "/unit/3?year=2016");
        assert_eq!(unit_href(3, None), "/unit/3");
    }

    #[test]
    fn test_configuration_error_is_escaped() {
        let page = configuration_error_page("missing <gcp_service_account>").into_string();
        assert!(page.contains("missing &lt;gcp_service_account&gt;"));
    }
}

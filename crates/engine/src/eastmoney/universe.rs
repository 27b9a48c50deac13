use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;

use common::{Error, Result, SymbolInfo, SymbolUniverse};

use super::EastmoneyClient;

/// Shenzhen main board (m:0 t:6) and Shanghai main board (m:1 t:2).
const MAIN_BOARDS: &str = "m:0+t:6,m:1+t:2";
const PAGE_SIZE: &str = "6000";

#[async_trait]
impl SymbolUniverse for EastmoneyClient {
    async fn list_symbols(&self) -> Result<Vec<SymbolInfo>> {
        let params = [
            ("pn", "1".to_string()),
            ("pz", PAGE_SIZE.to_string()),
            ("po", "1".to_string()),
            ("np", "1".to_string()),
            ("fltt", "2".to_string()),
            ("invt", "2".to_string()),
            ("fid", "f12".to_string()),
            ("fs", MAIN_BOARDS.to_string()),
            ("fields", "f12,f14".to_string()),
        ];
        let resp: ListResponse = self.get_json(&self.list_url, &params, self.fetch_timeout).await?;
        let symbols = parse_listing(resp);
        if symbols.is_empty() {
            return Err(Error::DataSource("symbol list is empty".into()));
        }
        Ok(symbols)
    }
}

/// Flatten a listing page into symbols, dropping rows without a code.
pub fn parse_listing(resp: ListResponse) -> Vec<SymbolInfo> {
    let rows = match resp.data.and_then(|d| d.diff) {
        Some(Diff::List(rows)) => rows,
        Some(Diff::Indexed(map)) => map.into_values().collect(),
        None => Vec::new(),
    };

    rows.into_iter()
        .filter_map(|row| {
            let code = row.code?.trim().to_string();
            if code.is_empty() {
                return None;
            }
            let name = row.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
            Some(SymbolInfo { code, name })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct ListResponse {
    data: Option<ListData>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    diff: Option<Diff>,
}

/// `np=1` returns an array; older pages return an index-keyed object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Diff {
    List(Vec<ListRow>),
    Indexed(BTreeMap<String, ListRow>),
}

#[derive(Debug, Deserialize)]
struct ListRow {
    #[serde(rename = "f12")]
    code: Option<String>,
    #[serde(rename = "f14")]
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_listing() {
        let resp: ListResponse = serde_json::from_str(
            r#"{"rc":0,"data":{"total":2,"diff":[{"f12":"600519","f14":"贵州茅台"},{"f12":"000001","f14":"平安银行"}]}}"#,
        )
        .unwrap();
        let symbols = parse_listing(resp);
        assert_eq!(symbols[0], SymbolInfo::new("600519", "贵州茅台"));
        assert_eq!(symbols.len(), 2);
    }

    #[test]
    fn parses_indexed_listing_and_skips_blank_codes() {
        let resp: ListResponse = serde_json::from_str(
            r#"{"data":{"diff":{"0":{"f12":"600036","f14":"招商银行"},"1":{"f12":"","f14":"?"},"2":{"f14":"无代码"}}}}"#,
        )
        .unwrap();
        let symbols = parse_listing(resp);
        assert_eq!(symbols, vec![SymbolInfo::new("600036", "招商银行")]);
    }

    #[test]
    fn null_data_is_empty() {
        let resp: ListResponse = serde_json::from_str(r#"{"rc":102,"data":null}"#).unwrap();
        assert!(parse_listing(resp).is_empty());
    }
}

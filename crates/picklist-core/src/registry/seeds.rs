//! Stock catalog: the option sets most applications register out of the box.
//!
//! Keys keep their established wire names (camelCase) so payloads produced
//! against the original registry stay valid.

use super::catalog::DefinitionCatalog;
use super::definition::Definition;
use crate::models::OptionItem;
use std::collections::HashMap;

/// Build the stock catalog.
pub fn stock_catalog() -> DefinitionCatalog {
    let mut defs = HashMap::new();

    defs.insert("gender".to_string(), Definition::from_static(gender()));
    defs.insert(
        "genderExtended".to_string(),
        Definition::from_static(
            gender()
                .into_iter()
                .chain([OptionItem::new("未知", "UNKNOWN")]),
        ),
    );
    defs.insert(
        "yesNo".to_string(),
        Definition::from_static([OptionItem::new("是", "Y"), OptionItem::new("否", "N")]),
    );
    defs.insert(
        "status".to_string(),
        Definition::from_static([
            OptionItem::new("啟用", "ACTIVE").with_color("green"),
            OptionItem::new("停用", "INACTIVE").with_color("red"),
        ]),
    );
    defs.insert(
        "opStatus".to_string(),
        Definition::from_static([
            OptionItem::new("草稿", "DRAFT").with_color("grey"),
            OptionItem::new("生效", "EFFECTIVE").with_color("green"),
            OptionItem::new("生效編輯中", "EFF_EDIT").with_color("orange"),
            OptionItem::new("失效", "INACTIVE").with_color("red"),
            OptionItem::new("待生效", "PENDING").with_color("blue"),
        ]),
    );
    defs.insert("cities".to_string(), Definition::from_static(cities()));
    defs.insert(
        "job".to_string(),
        Definition::from_static([
            OptionItem::new("前端工程師", "frontend"),
            OptionItem::new("後端工程師", "backend"),
            OptionItem::new("全端工程師", "fullstack"),
            OptionItem::new("設計師", "design"),
        ]),
    );
    defs.insert(
        "interest".to_string(),
        Definition::from_static([
            OptionItem::new("寫程式", "coding"),
            OptionItem::new("看書", "reading"),
            OptionItem::new("打電動", "gaming"),
        ]),
    );

    // Remote-shaped seeds with stand-in data, so the async paths have
    // ready-made fixtures until a real transport is wired in.
    defs.insert(
        "countries".to_string(),
        Definition::remote(|_args| async {
            Ok(vec![
                OptionItem::new("台灣", "TW"),
                OptionItem::new("日本", "JP"),
                OptionItem::new("美國", "US"),
                OptionItem::new("韓國", "KR"),
            ])
        }),
    );
    defs.insert(
        "currencies".to_string(),
        Definition::remote(|_args| async {
            Ok(vec![
                OptionItem::new("新台幣 (TWD)", "TWD"),
                OptionItem::new("美元 (USD)", "USD"),
                OptionItem::new("日圓 (JPY)", "JPY"),
                OptionItem::new("歐元 (EUR)", "EUR"),
            ])
        }),
    );
    defs.insert(
        "townships".to_string(),
        Definition::remote(|args| async move {
            let city = args.first().and_then(|v| v.as_str()).unwrap_or_default();
            Ok(match city {
                "TPE" => vec![
                    OptionItem::new("中正區", "100"),
                    OptionItem::new("大同區", "103"),
                    OptionItem::new("中山區", "104"),
                ],
                "KHH" => vec![
                    OptionItem::new("新興區", "800"),
                    OptionItem::new("前金區", "801"),
                    OptionItem::new("苓雅區", "802"),
                ],
                _ => Vec::new(),
            })
        }),
    );

    DefinitionCatalog::from_defs(defs)
}

fn gender() -> Vec<OptionItem> {
    vec![OptionItem::new("男", "MALE"), OptionItem::new("女", "FEMALE")]
}

fn cities() -> Vec<OptionItem> {
    vec![
        OptionItem::new("台北市", "TPE"),
        OptionItem::new("新北市", "NTPC"),
        OptionItem::new("桃園市", "TYC"),
        OptionItem::new("台中市", "TXG"),
        OptionItem::new("台南市", "TNN"),
        OptionItem::new("高雄市", "KHH"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_catalog_shape() {
        let catalog = stock_catalog();
        assert!(catalog.contains("status"));
        assert!(catalog.contains("townships"));
        assert_eq!(catalog.get("countries").unwrap().kind(), "remote");
        assert_eq!(catalog.get("cities").unwrap().kind(), "static");
    }
}

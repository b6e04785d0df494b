//! Reference universe of liquid ETFs, grouped by category

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundCategory {
    pub name: String,
    pub funds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub categories: Vec<FundCategory>,
}

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "Broad Market",
        &["SPY", "VOO", "IVV", "VTI", "QQQ", "QQQM", "DIA", "RSP", "SPLG", "ITOT"],
    ),
    (
        "Growth & Value",
        &["VUG", "IWF", "VTV", "IWD", "SCHG", "SCHV", "MGK", "MGV", "VBK", "VBR"],
    ),
    (
        "International",
        &[
            "VEA", "IEFA", "VWO", "IEMG", "EFA", "EEM", "VGK", "VPL", "EWJ", "EWZ", "EWG", "EWU",
            "EWC", "EWA", "FXI", "MCHI", "EWY", "EWT", "EWH", "EWW",
        ],
    ),
    (
        "Technology",
        &["XLK", "VGT", "FTEC", "IGV", "SMH", "SOXX", "XSD", "HACK", "FINX", "CLOU"],
    ),
    (
        "Financial",
        &["XLF", "VFH", "KBE", "KRE", "IAI", "KBWB", "KBWR", "FAS", "FAZ", "IYF"],
    ),
    (
        "Healthcare",
        &["XLV", "VHT", "IYH", "IBB", "XBI", "IHI", "ARKG", "BBH", "IHF", "XHS"],
    ),
    (
        "Consumer",
        &["XLY", "VCR", "XLP", "VDC", "IYC", "IYK", "RTH", "FXD", "FDIS", "FSTA"],
    ),
    (
        "Energy",
        &["XLE", "VDE", "IYE", "OIH", "XOP", "IEO", "PXE", "FENY", "ERX", "ERY"],
    ),
    (
        "Industrials",
        &["XLI", "VIS", "IYJ", "IYT", "JETS", "ITA", "PPA", "FIDU", "XAR", "IHI"],
    ),
    (
        "Real Estate & Utilities",
        &["XLRE", "VNQ", "IYR", "SCHH", "RWR", "XLU", "VPU", "IDU", "FUTY", "FXU"],
    ),
    (
        "Materials & Communication",
        &["XLB", "VAW", "IYM", "XLC", "VOX", "IYZ", "FCOM", "XTL", "MXI", "IGE"],
    ),
    (
        "Bonds",
        &["AGG", "BND", "LQD", "HYG", "TLT", "IEF", "SHY", "MUB", "VCIT", "VCSH"],
    ),
    (
        "Dividend",
        &["VIG", "SCHD", "VYM", "DVY", "SDY", "DGRO", "HDV", "NOBL", "DHS", "FVD"],
    ),
    (
        "Small & Mid Cap",
        &["IWM", "IJH", "VO", "VB", "IJR", "VXF", "SCHA", "SLYV", "IWN", "IWO"],
    ),
];

impl Universe {
    pub fn builtin() -> Self {
        Self {
            categories: BUILTIN
                .iter()
                .map(|(name, funds)| FundCategory {
                    name: name.to_string(),
                    funds: funds.iter().map(|f| f.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// All funds in category order, each listed once.
    pub fn funds(&self) -> Vec<String> {
        dedup_funds(self.categories.iter().flat_map(|c| c.funds.iter()))
    }

    pub fn category(&self, name: &str) -> Option<&FundCategory> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Uppercases identifiers and drops repeats, keeping the first occurrence.
pub fn dedup_funds<S: AsRef<str>>(funds: impl IntoIterator<Item = S>) -> Vec<String> {
    let mut seen = HashSet::new();
    funds
        .into_iter()
        .map(|f| f.as_ref().trim().to_uppercase())
        .filter(|f| !f.is_empty() && seen.insert(f.clone()))
        .collect()
}

//! Provider-native payload types.
//!
//! The open-data API is loose about numeric typing: counters and fees
//! arrive sometimes as JSON numbers, sometimes as digit strings, and
//! occasionally as empty strings. Numeric-ish fields are therefore kept
//! as raw [`serde_json::Value`]s and coerced on access, so one malformed
//! field never rejects a whole record at deserialization time.

use serde::Deserialize;
use serde_json::Value;

/// Coerces a JSON number or numeric string into an `i64`.
///
/// Fractional numbers are accepted and truncated (the provider encodes
/// some counters as `"123.0"`). Returns `None` for anything else.
#[must_use]
pub fn coerce_i64(value: Option<&Value>) -> Option<i64> {
    coerce_f64(value).map(|f| f as i64)
}

/// Coerces a JSON number or numeric string into an `f64`.
#[must_use]
pub fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
            }
        }
        _ => None,
    }
}

/// One row of the `GetParkingInfo` dataset, field names as the provider
/// sends them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawParkingRecord {
    #[serde(rename = "PKLT_NM")]
    pub name: Option<String>,
    #[serde(rename = "ADDR")]
    pub address: Option<String>,
    /// `"NW"` marks on-street lots, the only subtype with usable
    /// realtime counters.
    #[serde(rename = "PKLT_TYPE")]
    pub lot_type: Option<String>,
    /// `"1"` when the lot reports realtime occupancy.
    #[serde(rename = "PRK_STTS_YN")]
    pub realtime_flag: Option<String>,
    #[serde(rename = "TPKCT")]
    pub capacity: Option<Value>,
    #[serde(rename = "NOW_PRK_VHCL_CNT")]
    pub occupied: Option<Value>,
    /// Last realtime update, `YYYY-MM-DD HH:MM:SS`.
    #[serde(rename = "NOW_PRK_VHCL_UPDT_TM")]
    pub updated_at: Option<String>,
    #[serde(rename = "PAY_YN_NM")]
    pub paid_label: Option<String>,
    #[serde(rename = "SAT_CHGD_FREE_NM")]
    pub saturday_free_label: Option<String>,
    #[serde(rename = "LHLDY_CHGD_FREE_SE_NAME")]
    pub holiday_free_label: Option<String>,
    /// Base fee in won.
    #[serde(rename = "BSC_PRK_CRG")]
    pub basic_charge: Option<Value>,
    /// Minutes covered by the base fee.
    #[serde(rename = "BSC_PRK_HR")]
    pub basic_time_minutes: Option<Value>,
    #[serde(rename = "ADD_PRK_CRG")]
    pub add_charge: Option<Value>,
    #[serde(rename = "ADD_PRK_HR")]
    pub add_time_minutes: Option<Value>,
    // Operating windows as HHMM, selected by day-type.
    #[serde(rename = "WD_OPER_BGNG_TM")]
    pub weekday_open: Option<Value>,
    #[serde(rename = "WD_OPER_END_TM")]
    pub weekday_close: Option<Value>,
    #[serde(rename = "WE_OPER_BGNG_TM")]
    pub weekend_open: Option<Value>,
    #[serde(rename = "WE_OPER_END_TM")]
    pub weekend_close: Option<Value>,
    #[serde(rename = "LHLDY_OPER_BGNG_TM")]
    pub holiday_open: Option<Value>,
    #[serde(rename = "LHLDY_OPER_END_TM")]
    pub holiday_close: Option<Value>,
}

impl RawParkingRecord {
    #[must_use]
    pub fn capacity_count(&self) -> Option<i64> {
        coerce_i64(self.capacity.as_ref())
    }

    #[must_use]
    pub fn occupied_count(&self) -> Option<i64> {
        coerce_i64(self.occupied.as_ref())
    }
}

/// Envelope of the paged `GetParkingInfo` responses.
#[derive(Debug, Deserialize)]
pub struct ParkingInfoEnvelope {
    #[serde(rename = "GetParkingInfo")]
    pub body: ParkingInfoBody,
}

#[derive(Debug, Deserialize)]
pub struct ParkingInfoBody {
    pub list_total_count: u64,
    #[serde(default)]
    pub row: Vec<RawParkingRecord>,
}

/// Envelope of the per-area `citydata` endpoint. Only the live
/// commercial block is consumed; it is absent for some areas.
#[derive(Debug, Deserialize)]
pub struct CityDataEnvelope {
    #[serde(rename = "CITYDATA")]
    pub citydata: Option<CityData>,
}

#[derive(Debug, Deserialize)]
pub struct CityData {
    #[serde(rename = "LIVE_CMRCL_STTS")]
    pub commercial: Option<CommercialStatus>,
}

/// Area-level commercial activity summary plus per-category detail rows.
#[derive(Debug, Clone, Deserialize)]
pub struct CommercialStatus {
    #[serde(rename = "AREA_CMRCL_LVL")]
    pub activity_level: Option<String>,
    #[serde(rename = "AREA_SH_PAYMENT_CNT")]
    pub payment_count: Option<Value>,
    #[serde(rename = "AREA_SH_PAYMENT_AMT_MIN")]
    pub min_amount: Option<Value>,
    #[serde(rename = "AREA_SH_PAYMENT_AMT_MAX")]
    pub max_amount: Option<Value>,
    #[serde(rename = "CMRCL_RSB", default)]
    pub categories: Vec<CommercialCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommercialCategory {
    #[serde(rename = "RSB_MID_CTGR")]
    pub category: Option<String>,
    #[serde(rename = "RSB_PAYMENT_LVL")]
    pub level: Option<String>,
    #[serde(rename = "RSB_SH_PAYMENT_CNT")]
    pub payment_count: Option<Value>,
    #[serde(rename = "RSB_SH_PAYMENT_AMT_MIN")]
    pub min_amount: Option<Value>,
    #[serde(rename = "RSB_SH_PAYMENT_AMT_MAX")]
    pub max_amount: Option<Value>,
    #[serde(rename = "RSB_MCT_CNT")]
    pub store_count: Option<Value>,
    #[serde(rename = "RSB_MCT_TIME")]
    pub reported_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn coerce_accepts_numbers_and_digit_strings() {
        assert_eq!(coerce_i64(Some(&json!(42))), Some(42));
        assert_eq!(coerce_i64(Some(&json!("42"))), Some(42));
        assert_eq!(coerce_i64(Some(&json!("42.0"))), Some(42));
        assert_eq!(coerce_f64(Some(&json!("0.5"))), Some(0.5));
    }

    #[test]
    fn coerce_rejects_blank_and_non_numeric() {
        assert_eq!(coerce_i64(Some(&json!(""))), None);
        assert_eq!(coerce_i64(Some(&json!("  "))), None);
        assert_eq!(coerce_i64(Some(&json!("n/a"))), None);
        assert_eq!(coerce_i64(Some(&json!(null))), None);
        assert_eq!(coerce_i64(None), None);
    }

    #[test]
    fn parking_record_tolerates_mixed_numeric_typing() {
        let record: RawParkingRecord = serde_json::from_value(json!({
            "PKLT_NM": "세종로 공영주차장",
            "TPKCT": "100",
            "NOW_PRK_VHCL_CNT": 70,
        }))
        .unwrap();
        assert_eq!(record.capacity_count(), Some(100));
        assert_eq!(record.occupied_count(), Some(70));
    }

    #[test]
    fn citydata_without_commercial_block_parses() {
        let envelope: CityDataEnvelope =
            serde_json::from_value(json!({"CITYDATA": {"AREA_NM": "강남역"}})).unwrap();
        assert!(envelope.citydata.unwrap().commercial.is_none());
    }
}

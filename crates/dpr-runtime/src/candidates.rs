//! Fact-stream candidates built from typed records.
//!
//! One builder per stream. Column names must match `FactStream::columns`.

use dpr_config::{EngineConfig, RuleConfig};
use dpr_extract::{FieldDailyComment, PlatformDailyRecord, WellDailyRecord};
use dpr_reconcile::{Attributes, Candidate, DateId, FactStream, SnapshotKey};

/// Date ids of a row's three test dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestDateIds {
    pub well_test: DateId,
    pub gas_test: DateId,
    pub lab: DateId,
}

impl TestDateIds {
    /// Date the gas-test snapshot is keyed by. The primary field records gas
    /// tests against the well-test date.
    pub fn gas_key(&self, field_id: i64, rules: &RuleConfig) -> DateId {
        if field_id == rules.primary_field_id {
            self.well_test
        } else {
            self.gas_test
        }
    }
}

fn well_key(rec: &WellDailyRecord) -> SnapshotKey {
    SnapshotKey::Well(rec.ctx.well_id)
}

pub fn stock(rec: &WellDailyRecord, report: DateId, cfg: &EngineConfig) -> Candidate {
    let s = &rec.stock;
    let attrs = Attributes::new()
        .with("well_stock_category_id", s.well_stock_category_id)
        .with("well_stock_sub_category_id", cfg.well_stock_sub_category_id)
        .with("production_well_stock_sub_category_id", s.production_sub_category_id)
        .with("production_method_id", s.production_method_id);
    Candidate::new(FactStream::WellStock, well_key(rec), report, attrs)
}

pub fn completion(rec: &WellDailyRecord, report: DateId) -> Candidate {
    let c = &rec.completion;
    let attrs = Attributes::new()
        .with("horizon_id", c.horizon_id)
        .with("casing", c.casing.clone())
        .with("completion_interval", c.completion_interval.clone())
        .with("tubing1_depth", c.tubing1_depth.clone())
        .with("tubing1_length", c.tubing1_length.clone())
        .with("tubing2_depth", c.tubing2_depth.clone())
        .with("tubing2_length", c.tubing2_length.clone())
        .with("tubing3_depth", c.tubing3_depth.clone())
        .with("tubing3_length", c.tubing3_length.clone())
        .with("packer_depth", c.packer_depth.clone());
    Candidate::new(FactStream::Completions, well_key(rec), report, attrs)
}

pub fn downtime(rec: &WellDailyRecord, report: DateId) -> Candidate {
    let d = &rec.downtime;
    let attrs = Attributes::new()
        .with("downtime_category", d.downtime_category.clone())
        .with("production_sub_skins_activity_id", d.sub_skin_activity_id)
        .with("comments", d.comments.clone());
    Candidate::new(FactStream::WellDowntimeReasons, well_key(rec), report, attrs)
}

pub fn parameters(rec: &WellDailyRecord, report: DateId) -> Candidate {
    let p = &rec.parameters;
    let attrs = Attributes::new()
        .with("flowmeter", p.flowmeter.clone())
        .with("well_uptime_hours", p.uptime_hours)
        .with("choke", p.choke)
        .with("pqa", p.pqa)
        .with("phf", p.phf)
        .with("pba", p.pba)
        .with("p6x9", p.p6x9)
        .with("p9x13", p.p9x13)
        .with("p13x20", p.p13x20)
        .with("gaslift_gas", p.gaslift_gas())
        .with("gaslift_system_pressure", p.gaslift_system_pressure)
        .with("pump_depth", p.pump_depth)
        .with("pump_frequency", p.pump_frequency)
        .with("pump_hydrostatic_pressure", p.pump_hydrostatic_pressure)
        .with("esp_pump_size", p.esp_pump_size)
        .with("esp_pump_stages", p.esp_pump_stages)
        .with("esp_pump_rate", p.esp_pump_rate)
        .with("esp_pump_head", p.esp_pump_head)
        .with("esp_downhole_gas_separator", p.esp_downhole_gas_separator.clone())
        .with("srp_pumpjack_type", p.srp_pumpjack_type.clone())
        .with("srp_pump_plunger_diameter", p.srp_pump_plunger_diameter)
        .with("srp_plunger_stroke_length", p.srp_plunger_stroke_length)
        .with("srp_balancer_oscillation_frequency", p.srp_balancer_oscillation_frequency)
        .with("srp_pump_rate_coefficient", p.srp_pump_rate_coefficient)
        .with("srp_max_motor_speed", p.srp_max_motor_speed)
        .with("srp_shaft_diameter", p.srp_shaft_diameter)
        .with("pcp_pump_rate", p.pcp_pump_rate)
        .with("pcp_rpm", p.pcp_rpm)
        .with("pcp_screw_diameter", p.pcp_screw_diameter)
        .with("static_fluid_level", p.static_fluid_level)
        .with("dynamic_fluid_level", p.dynamic_fluid_level)
        .with("responsible_person", p.responsible_person.clone())
        .with("phone_number", p.phone_number.clone());
    Candidate::new(FactStream::DailyWellParameters, well_key(rec), report, attrs)
}

pub fn well_test(rec: &WellDailyRecord, report: DateId, test: DateId) -> Candidate {
    let t = &rec.well_test;
    let attrs = Attributes::new()
        .with("report_date_id", report)
        .with("liquid_ton", t.liquid_ton)
        .with("oil_ton", t.oil_ton)
        .with("water_ton", t.water_ton);
    Candidate::new(FactStream::WellTests, well_key(rec), test, attrs)
}

pub fn gas_test(rec: &WellDailyRecord, report: DateId, key_date: DateId) -> Candidate {
    let g = &rec.gas_test;
    let attrs = Attributes::new()
        .with("report_date_id", report)
        .with("total_gas", g.total_gas)
        .with("gaslift_gas", g.gaslift_gas);
    Candidate::new(FactStream::GasWellTests, well_key(rec), key_date, attrs)
}

pub fn lab(rec: &WellDailyRecord, report: DateId, lab: DateId) -> Candidate {
    let l = &rec.lab;
    let attrs = Attributes::new()
        .with("report_date_id", report)
        .with("water_cut", l.water_cut)
        .with("mechanical_impurities", l.mechanical_impurities);
    Candidate::new(FactStream::LaboratoryResults, well_key(rec), lab, attrs)
}

pub fn flowmeter(rec: &PlatformDailyRecord, platform_id: i64, report: DateId) -> Candidate {
    let attrs = Attributes::new()
        .with("reading1", rec.reading1)
        .with("reading2", rec.reading2)
        .with("reading3", rec.reading3)
        .with("reading4", rec.reading4)
        .with("calibration_date", rec.calibration_date);
    Candidate::new(FactStream::Flowmeters, SnapshotKey::Platform(platform_id), report, attrs)
}

pub fn field_comment(c: &FieldDailyComment, report: DateId) -> Candidate {
    let key = SnapshotKey::FieldPlatform {
        field_id: c.field_id,
        platform: c.platform.clone(),
    };
    let attrs = Attributes::new().with("general_comments", c.general_comment.clone());
    Candidate::new(FactStream::DailyGeneralComments, key, report, attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dpr_extract::*;

    fn record() -> WellDailyRecord {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        WellDailyRecord {
            ctx: RowContext {
                row_index: 14,
                field_id: 1,
                platform: "8".into(),
                platform_id: 8,
                well_id: 801,
                well_number: "101".into(),
            },
            report_date: d,
            stock: StockGroup::default(),
            completion: CompletionGroup::default(),
            downtime: DowntimeGroup::default(),
            parameters: ParameterGroup {
                gaslift_gas_day: Some(2400.0),
                uptime_hours: Some(12.0),
                ..ParameterGroup::default()
            },
            well_test: WellTestGroup {
                test_date: Ok(d),
                liquid_ton: Some(40.0),
                oil_ton: None,
                water_ton: None,
            },
            gas_test: GasTestGroup {
                test_date: Ok(d),
                total_gas: None,
                gaslift_gas: None,
            },
            lab: LabGroup {
                lab_date: Ok(d),
                water_cut: None,
                mechanical_impurities: None,
            },
        }
    }

    fn columns(c: &Candidate) -> Vec<&str> {
        c.attrs.iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn every_builder_writes_exactly_the_stream_columns() {
        let cfg = EngineConfig::default();
        let rec = record();
        let r = DateId(10);
        let platform = PlatformDailyRecord {
            platform: "8".into(),
            platform_id: Some(8),
            ..PlatformDailyRecord::default()
        };
        let comment = FieldDailyComment {
            field_id: 1,
            platform: "8".into(),
            general_comment: None,
        };

        let all = [
            stock(&rec, r, &cfg),
            completion(&rec, r),
            downtime(&rec, r),
            parameters(&rec, r),
            well_test(&rec, r, DateId(7)),
            gas_test(&rec, r, DateId(7)),
            lab(&rec, r, DateId(6)),
            flowmeter(&platform, 8, r),
            field_comment(&comment, r),
        ];
        for c in &all {
            let want: Vec<&str> = c.stream.column_names().collect();
            assert_eq!(columns(c), want, "{}", c.stream);
        }
        let streams: Vec<FactStream> = all.iter().map(|c| c.stream).collect();
        let mut expected = FactStream::ALL.to_vec();
        expected.sort();
        let mut got = streams.clone();
        got.sort();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_streams_key_by_their_own_date() {
        let rec = record();
        let c = well_test(&rec, DateId(10), DateId(7));
        assert_eq!(c.date, DateId(7));
        assert_eq!(c.attrs.get("report_date_id"), &dpr_reconcile::AttrValue::Int(10));
    }

    #[test]
    fn parameters_carry_derived_gaslift() {
        let c = parameters(&record(), DateId(10));
        assert_eq!(c.attrs.get("gaslift_gas"), &dpr_reconcile::AttrValue::Num(1200.0));
    }

    #[test]
    fn gas_test_key_date_depends_on_field() {
        let ids = TestDateIds {
            well_test: DateId(5),
            gas_test: DateId(3),
            lab: DateId(4),
        };
        let rules = RuleConfig::default();
        assert_eq!(ids.gas_key(rules.primary_field_id, &rules), DateId(5));
        assert_eq!(ids.gas_key(rules.primary_field_id + 1, &rules), DateId(3));
    }
}

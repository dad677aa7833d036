use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    civil::hhmm,
    errors::{AgendaError, AgendaResult},
    models::template::DAYS_IN_WEEK,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    /// Sent to the client, awaiting signature.
    Pending,
    Signed,
    Cancelled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Pending => "PENDING",
            ContractStatus::Signed => "SIGNED",
            ContractStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractStatus {
    type Err = AgendaError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "PENDING" => Ok(ContractStatus::Pending),
            "SIGNED" => Ok(ContractStatus::Signed),
            "CANCELLED" => Ok(ContractStatus::Cancelled),
            other => Err(AgendaError::Validation(format!("unknown contract status '{other}'"))),
        }
    }
}

/// "Every <weekday> at <time>" attached to a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleRule {
    pub weekday: u8,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
}

/// Local mirror of a service contract owned by the surrounding product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub status: ContractStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub num_appointments: Option<u32>,
    #[serde(default)]
    pub schedule_rules: Vec<ScheduleRule>,
}

impl Contract {
    pub fn is_signed(&self) -> bool {
        self.status == ContractStatus::Signed
    }

    pub fn validate(&self) -> AgendaResult<()> {
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(AgendaError::Validation(
                    "contract end date is before its start date".to_string(),
                ));
            }
        }
        if self.num_appointments == Some(0) {
            return Err(AgendaError::Validation(
                "num_appointments must be positive when set".to_string(),
            ));
        }
        if let Some(rule) = self.schedule_rules.iter().find(|rule| rule.weekday >= DAYS_IN_WEEK) {
            return Err(AgendaError::Validation(format!(
                "schedule rule weekday {} is out of range",
                rule.weekday
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertContractRequest {
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub status: ContractStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub num_appointments: Option<u32>,
    #[serde(default)]
    pub schedule_rules: Vec<ScheduleRule>,
}

impl UpsertContractRequest {
    pub fn into_contract(self, id: Uuid) -> Contract {
        Contract {
            id,
            professional_id: self.professional_id,
            patient_id: self.patient_id,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            num_appointments: self.num_appointments,
            schedule_rules: self.schedule_rules,
        }
    }
}

/// Overrides for expanding a contract's rules; absent fields fall back to the
/// contract's own start date, end date and appointment count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivateContractRequest {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignContractResponse {
    pub contract_id: Uuid,
    pub promoted: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndContractRequest {
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndContractResponse {
    pub contract_id: Uuid,
    pub end_date: NaiveDate,
    pub ended: Vec<Uuid>,
}

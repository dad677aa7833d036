#![allow(dead_code)]

use agenda_core::{
    civil::Moment,
    models::{
        contract::{Contract, ContractStatus, ScheduleRule},
        template::{AvailabilityTemplate, TimeRange},
    },
    services::templates,
    store::{AgendaStore, MemoryStore},
};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

pub fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Sunday 2025-06-01, noon. Tomorrow is Monday 2025-06-02.
pub fn sunday_noon() -> Moment {
    Moment::at(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(), &Utc)
}

pub const MONDAY: u8 = 1;
pub const WEDNESDAY: u8 = 3;

/// 09:00-17:00, 50-minute sessions, 10-minute buffer, lunch 12:00-13:00.
pub fn workday(weekday: u8) -> AvailabilityTemplate {
    AvailabilityTemplate {
        weekday,
        enabled: true,
        window: Some(TimeRange::new(t(9, 0), t(17, 0))),
        session_minutes: 50,
        buffer_minutes: 10,
        lunch: Some(TimeRange::new(t(12, 0), t(13, 0))),
    }
}

pub fn contract(professional_id: Uuid, status: ContractStatus) -> Contract {
    Contract {
        id: Uuid::new_v4(),
        professional_id,
        patient_id: Uuid::new_v4(),
        status,
        start_date: d(2025, 6, 2),
        end_date: None,
        num_appointments: None,
        schedule_rules: vec![
            ScheduleRule { weekday: MONDAY, time: t(9, 0) },
            ScheduleRule { weekday: WEDNESDAY, time: t(9, 0) },
        ],
    }
}

pub struct Fixture {
    pub store: MemoryStore,
    pub professional_id: Uuid,
    pub contract: Contract,
}

/// Store with Monday to Friday working days and one signed contract.
pub async fn fixture() -> Fixture {
    let store = MemoryStore::new();
    let professional_id = Uuid::new_v4();
    templates::put_week(&store, professional_id, (1..=5).map(workday).collect())
        .await
        .unwrap();
    let contract = store
        .upsert_contract(&contract(professional_id, ContractStatus::Signed))
        .await
        .unwrap();
    Fixture {
        store,
        professional_id,
        contract,
    }
}

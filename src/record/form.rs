//! The form shared by the add record and edit record pages.

use maud::{Markup, html};
use serde::{Deserialize, Deserializer, de};
use time::Date;

use crate::{
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    record::core::{DailyRecord, ExpenseRecord, IncomeRecord, Ledger, LedgerCategory, MAX_AMOUNT},
};

/// Read an amount where an empty field means zero.
fn amount_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();

    if raw.is_empty() {
        return Ok(0);
    }

    let amount: i64 = raw
        .parse()
        .map_err(|_| de::Error::custom(format!("\"{raw}\" is not a whole number")))?;

    if amount < 0 {
        return Err(de::Error::custom(format!(
            "amounts cannot be negative, got {amount}"
        )));
    }

    if amount > MAX_AMOUNT {
        return Err(de::Error::custom(format!(
            "amounts cannot be more than {MAX_AMOUNT}, got {amount}"
        )));
    }

    Ok(amount)
}

/// The submitted values of the record form.
///
/// Any amount that is missing or left blank is zero.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordForm {
    pub date: Date,

    #[serde(default, deserialize_with = "amount_or_zero")]
    pub jalgaon_memo: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub jalgaon_luggage: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub dhule_memo: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub manmohan_memo: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub nashik_luggage: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub rokadi: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub return_ticket: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub lab_payment: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub difference: i64,

    #[serde(default, deserialize_with = "amount_or_zero")]
    pub advance: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub diesel: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub other_expenses: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub maintenance: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub chart_commission: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub drivers_salary: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub cleaner_salary: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub hinduza_finance: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub road_tax: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub gprs: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub bedsheet_washing: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub jay_ambe: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub pigmi: i64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub staff_payment: i64,
}

impl From<RecordForm> for DailyRecord {
    fn from(form: RecordForm) -> Self {
        Self {
            date: form.date,
            income: IncomeRecord {
                jalgaon_memo: form.jalgaon_memo,
                jalgaon_luggage: form.jalgaon_luggage,
                dhule_memo: form.dhule_memo,
                manmohan_memo: form.manmohan_memo,
                nashik_luggage: form.nashik_luggage,
                rokadi: form.rokadi,
                return_ticket: form.return_ticket,
                lab_payment: form.lab_payment,
                difference: form.difference,
            },
            expenses: ExpenseRecord {
                advance: form.advance,
                diesel: form.diesel,
                other_expenses: form.other_expenses,
                maintenance: form.maintenance,
                chart_commission: form.chart_commission,
                drivers_salary: form.drivers_salary,
                cleaner_salary: form.cleaner_salary,
                hinduza_finance: form.hinduza_finance,
                road_tax: form.road_tax,
                gprs: form.gprs,
                bedsheet_washing: form.bedsheet_washing,
                jay_ambe: form.jay_ambe,
                pigmi: form.pigmi,
                staff_payment: form.staff_payment,
            },
        }
    }
}

fn amount_fieldset<L: Ledger>(legend: &str, record: &L) -> Markup {
    html! {
        fieldset class="w-full space-y-4 md:space-y-0 md:grid md:grid-cols-2 md:gap-4"
        {
            legend class="mb-2 text-lg font-semibold" { (legend) }

            @for &category in L::Category::ALL {
                div
                {
                    label
                        for=(category.column())
                        class=(FORM_LABEL_STYLE)
                    {
                        (category.label())
                    }

                    input
                        name=(category.column())
                        id=(category.column())
                        type="number"
                        step="1"
                        min="0"
                        max=(MAX_AMOUNT)
                        value=(record.amount(category))
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }
        }
    }
}

/// The inputs for a daily record.
///
/// The date is the record's key, so it is read-only when `date_is_editable` is false.
pub fn record_form_fields(record: &DailyRecord, date_is_editable: bool) -> Markup {
    html! {
        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="date"
                value=(record.date)
                required
                readonly[!date_is_editable]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        (amount_fieldset("Income", &record.income))
        (amount_fieldset("Expenses", &record.expenses))
    }
}

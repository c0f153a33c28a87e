//! Summing a month of records for the dashboard and the detail table.

use std::collections::BTreeMap;

use time::Date;

use crate::record::{
    ExpenseCategory, ExpenseRecord, IncomeCategory, IncomeRecord, Ledger, LedgerCategory,
};

/// The label of the synthetic entry or row holding the sum of everything else.
pub const TOTAL_LABEL: &str = "Total";

/// The income categories shown in the detail table, from "Jalgaon memo" to "Lab payment".
const DETAIL_INCOME_COLUMNS: usize = 8;
/// The expense categories shown in the detail table, from "Advance" to "Chart commission".
const DETAIL_EXPENSE_COLUMNS: usize = 5;

/// The sum of each category of a ledger over a period, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    entries: Vec<(&'static str, i64)>,
    total: i64,
}

impl CategorySummary {
    /// Sum every category over `rows`. No rows gives all zeros.
    pub fn from_rows<L: Ledger>(rows: &[(Date, L)]) -> Self {
        let entries = L::Category::ALL
            .iter()
            .map(|&category| {
                let sum: i64 = rows.iter().map(|(_, row)| row.amount(category)).sum();
                (category.label(), sum)
            })
            .collect::<Vec<_>>();
        let total = entries.iter().map(|(_, sum)| sum).sum();

        Self { entries, total }
    }

    /// The per-category sums without the total.
    pub fn categories(&self) -> &[(&'static str, i64)] {
        &self.entries
    }

    /// The sum of all category sums.
    pub fn total(&self) -> i64 {
        self.total
    }

    /// The per-category sums followed by a "Total" entry.
    pub fn entries_with_total(&self) -> impl Iterator<Item = (&'static str, i64)> + '_ {
        self.entries
            .iter()
            .copied()
            .chain(std::iter::once((TOTAL_LABEL, self.total)))
    }
}

/// The income and expense summaries for one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyOverview {
    pub income: CategorySummary,
    pub expenses: CategorySummary,
}

impl MonthlyOverview {
    pub fn new(
        income_rows: &[(Date, IncomeRecord)],
        expense_rows: &[(Date, ExpenseRecord)],
    ) -> Self {
        Self {
            income: CategorySummary::from_rows(income_rows),
            expenses: CategorySummary::from_rows(expense_rows),
        }
    }

    /// Income and expenses added together, i.e. all money that moved in the month.
    pub fn combined_total(&self) -> i64 {
        self.income.total() + self.expenses.total()
    }

    /// Income minus expenses.
    pub fn net(&self) -> i64 {
        self.income.total() - self.expenses.total()
    }
}

/// One day in the detail table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub date: Date,
    pub amounts: Vec<i64>,
}

/// The day-by-day table of selected income and expense columns for a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTable {
    /// The column labels for the amounts, income first.
    pub headers: Vec<&'static str>,
    /// One row per date, oldest first.
    pub rows: Vec<DetailRow>,
    /// The column-wise sums of `rows`, shown in a row labelled [TOTAL_LABEL].
    pub totals: Vec<i64>,
}

fn detail_amounts<L: Ledger>(record: Option<&L>, column_count: usize) -> Vec<i64> {
    L::Category::ALL
        .iter()
        .take(column_count)
        .map(|&category| record.map_or(0, |record| record.amount(category)))
        .collect()
}

impl DetailTable {
    /// Join the income and expense rows by date.
    ///
    /// A date found in only one ledger gets zeros for the other.
    pub fn new(
        income_rows: &[(Date, IncomeRecord)],
        expense_rows: &[(Date, ExpenseRecord)],
    ) -> Self {
        let headers = IncomeCategory::ALL
            .iter()
            .take(DETAIL_INCOME_COLUMNS)
            .map(|category| category.label())
            .chain(
                ExpenseCategory::ALL
                    .iter()
                    .take(DETAIL_EXPENSE_COLUMNS)
                    .map(|category| category.label()),
            )
            .collect::<Vec<_>>();

        let mut by_date: BTreeMap<Date, (Option<&IncomeRecord>, Option<&ExpenseRecord>)> =
            BTreeMap::new();
        for (date, income) in income_rows {
            by_date.entry(*date).or_default().0 = Some(income);
        }
        for (date, expenses) in expense_rows {
            by_date.entry(*date).or_default().1 = Some(expenses);
        }

        let rows = by_date
            .into_iter()
            .map(|(date, (income, expenses))| {
                let mut amounts = detail_amounts(income, DETAIL_INCOME_COLUMNS);
                amounts.extend(detail_amounts(expenses, DETAIL_EXPENSE_COLUMNS));
                DetailRow { date, amounts }
            })
            .collect::<Vec<_>>();

        let mut totals = vec![0; headers.len()];
        for row in &rows {
            for (total, amount) in totals.iter_mut().zip(&row.amounts) {
                *total += amount;
            }
        }

        Self {
            headers,
            rows,
            totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::record::{
        ExpenseCategory, ExpenseRecord, IncomeCategory, IncomeRecord, LedgerCategory, MAX_AMOUNT,
    };

    use super::{CategorySummary, DetailTable, MonthlyOverview, TOTAL_LABEL};

    fn income(jalgaon_memo: i64, rokadi: i64, difference: i64) -> IncomeRecord {
        IncomeRecord {
            jalgaon_memo,
            rokadi,
            difference,
            ..Default::default()
        }
    }

    fn expenses(advance: i64, diesel: i64, staff_payment: i64) -> ExpenseRecord {
        ExpenseRecord {
            advance,
            diesel,
            staff_payment,
            ..Default::default()
        }
    }

    #[test]
    fn total_is_sum_of_category_sums() {
        let rows: Vec<(Date, IncomeRecord)> = vec![
            (date!(2023 - 03 - 01), income(100, 20, 3)),
            (date!(2023 - 03 - 02), income(400, 30, 7)),
        ];

        let summary = CategorySummary::from_rows(&rows);

        let category_sum: i64 = summary.categories().iter().map(|(_, sum)| sum).sum();
        assert_eq!(summary.total(), category_sum);
        assert_eq!(summary.total(), 560);
        assert!(summary.categories().contains(&("Jalgaon memo", 500)));
        assert!(summary.categories().contains(&("Rokadi", 50)));
        assert!(summary.categories().contains(&("Difference amount of payment", 10)));
    }

    #[test]
    fn entries_end_with_total() {
        let rows = vec![(date!(2023 - 03 - 01), expenses(1, 2, 3))];

        let summary = CategorySummary::from_rows(&rows);
        let entries = summary.entries_with_total().collect::<Vec<_>>();

        assert_eq!(entries.len(), 15);
        assert_eq!(entries.first(), Some(&("Advance", 1)));
        assert_eq!(entries.last(), Some(&(TOTAL_LABEL, 6)));
    }

    fn income_filled_with(amount: i64) -> IncomeRecord {
        IncomeRecord {
            jalgaon_memo: amount,
            jalgaon_luggage: amount,
            dhule_memo: amount,
            manmohan_memo: amount,
            nashik_luggage: amount,
            rokadi: amount,
            return_ticket: amount,
            lab_payment: amount,
            difference: amount,
        }
    }

    fn expenses_filled_with(amount: i64) -> ExpenseRecord {
        ExpenseRecord {
            advance: amount,
            diesel: amount,
            other_expenses: amount,
            maintenance: amount,
            chart_commission: amount,
            drivers_salary: amount,
            cleaner_salary: amount,
            hinduza_finance: amount,
            road_tax: amount,
            gprs: amount,
            bedsheet_washing: amount,
            jay_ambe: amount,
            pigmi: amount,
            staff_payment: amount,
        }
    }

    #[test]
    fn month_of_largest_amounts_does_not_overflow() {
        let days = 1..=31u8;
        let income_rows = days
            .clone()
            .map(|day| {
                let date = Date::from_calendar_date(2023, time::Month::March, day).unwrap();
                (date, income_filled_with(MAX_AMOUNT))
            })
            .collect::<Vec<_>>();
        let expense_rows = days
            .map(|day| {
                let date = Date::from_calendar_date(2023, time::Month::March, day).unwrap();
                (date, expenses_filled_with(MAX_AMOUNT))
            })
            .collect::<Vec<_>>();

        let overview = MonthlyOverview::new(&income_rows, &expense_rows);
        let table = DetailTable::new(&income_rows, &expense_rows);

        let want_income = 31 * MAX_AMOUNT * IncomeCategory::ALL.len() as i64;
        let want_expenses = 31 * MAX_AMOUNT * ExpenseCategory::ALL.len() as i64;
        assert_eq!(overview.income.total(), want_income);
        assert_eq!(overview.expenses.total(), want_expenses);
        assert_eq!(overview.combined_total(), want_income + want_expenses);
        assert_eq!(overview.net(), want_income - want_expenses);
        assert!(table.totals.iter().all(|&total| total == 31 * MAX_AMOUNT));
    }

    #[test]
    fn no_rows_gives_zeros() {
        let summary = CategorySummary::from_rows::<IncomeRecord>(&[]);

        assert_eq!(summary.categories().len(), 9);
        assert!(summary.categories().iter().all(|(_, sum)| *sum == 0));
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn overview_combined_total_and_net() {
        let overview = MonthlyOverview::new(
            &[(date!(2023 - 03 - 15), income(500, 0, 0))],
            &[(date!(2023 - 03 - 15), expenses(100, 0, 0))],
        );

        assert_eq!(overview.income.total(), 500);
        assert_eq!(overview.expenses.total(), 100);
        assert_eq!(overview.combined_total(), 600);
        assert_eq!(overview.net(), 400);
    }

    #[test]
    fn detail_table_has_selected_columns() {
        let table = DetailTable::new(&[], &[]);

        assert_eq!(
            table.headers,
            [
                "Jalgaon memo",
                "Jalgaon luggage",
                "Dhule office memo",
                "Manmohan memo",
                "Nashik office luggage",
                "Rokadi",
                "Return ticket payment",
                "Lab payment",
                "Advance",
                "Diesel",
                "Other expenses",
                "Maintenance",
                "Chart commission",
            ]
        );
        assert!(table.rows.is_empty());
        assert_eq!(table.totals, vec![0; 13]);
    }

    #[test]
    fn detail_totals_are_column_sums() {
        let income_rows = vec![
            (date!(2023 - 03 - 01), income(100, 20, 99)),
            (date!(2023 - 03 - 02), income(400, 30, 99)),
        ];
        let expense_rows = vec![
            (date!(2023 - 03 - 01), expenses(10, 5, 99)),
            (date!(2023 - 03 - 02), expenses(20, 6, 99)),
        ];

        let table = DetailTable::new(&income_rows, &expense_rows);

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].date, date!(2023 - 03 - 01));
        assert_eq!(
            table.rows[0].amounts,
            [100, 0, 0, 0, 0, 20, 0, 0, 10, 5, 0, 0, 0]
        );
        for column in 0..table.headers.len() {
            let column_sum: i64 = table.rows.iter().map(|row| row.amounts[column]).sum();
            assert_eq!(table.totals[column], column_sum, "column {column}");
        }
        assert_eq!(table.totals, [500, 0, 0, 0, 0, 50, 0, 0, 30, 11, 0, 0, 0]);
    }

    #[test]
    fn detail_rows_are_joined_by_date() {
        let income_rows = vec![(date!(2023 - 03 - 02), income(1, 0, 0))];
        let expense_rows = vec![
            (date!(2023 - 03 - 01), expenses(2, 0, 0)),
            (date!(2023 - 03 - 02), expenses(3, 0, 0)),
        ];

        let table = DetailTable::new(&income_rows, &expense_rows);

        let dates = table.rows.iter().map(|row| row.date).collect::<Vec<_>>();
        assert_eq!(dates, [date!(2023 - 03 - 01), date!(2023 - 03 - 02)]);
        assert_eq!(table.rows[0].amounts[0], 0);
        assert_eq!(table.rows[0].amounts[8], 2);
        assert_eq!(table.rows[1].amounts[0], 1);
        assert_eq!(table.rows[1].amounts[8], 3);
    }
}

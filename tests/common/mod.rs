#![allow(dead_code)]

use rust_xlsxwriter::{Format, Workbook};

/// One cell written into a fixture workbook
#[derive(Clone, Copy, Debug)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    /// Excel serial day number shown with a date format
    Date(f64),
    Blank,
}

pub use Cell::{Blank, Date, Number, Text};

// Helper function to build an in-memory .xlsx with a header row
pub fn workbook(headers: &[&str], rows: &[Vec<Cell>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let worksheet = workbook.add_worksheet();

    for (c, header) in headers.iter().enumerate() {
        if !header.is_empty() {
            worksheet.write_string(0, c as u16, *header).unwrap();
        }
    }

    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match *cell {
                Text(s) => {
                    worksheet.write_string(r, c, s).unwrap();
                }
                Number(n) => {
                    worksheet.write_number(r, c, n).unwrap();
                }
                Date(serial) => {
                    worksheet
                        .write_number_with_format(r, c, serial, &date_format)
                        .unwrap();
                }
                Blank => {}
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}

pub const WORKER_HEADERS: &[&str] = &["Worker Type", "Gross Pay", "Taxes", "Pay Date"];

// The two-row worker sheet used across the end-to-end checks
pub fn worker_workbook() -> Vec<u8> {
    workbook(
        WORKER_HEADERS,
        &[
            vec![Text("Contractor"), Number(1000.0), Number(150.0), Text("2024-01-01")],
            vec![Text("Employee"), Number(2000.0), Number(400.0), Text("2024-01-15")],
        ],
    )
}

// A larger worker sheet with repeated categories and mixed date cells
pub fn busy_worker_workbook() -> Vec<u8> {
    workbook(
        &["Employee Name", "Worker Type", "Gross Pay", "Taxes", "Pay Date"],
        &[
            vec![Text("Ada"), Text("Employee"), Number(3200.5), Number(640.25), Date(45306.0)],
            vec![Text("Brook"), Text("Contractor"), Number(1800.0), Number(0.0), Text("2024-01-31")],
            vec![Text("Cruz"), Text("Employee"), Number(2900.0), Number(580.0), Text("01/15/2024")],
            vec![Text("Dana"), Text("Intern"), Number(950.75), Number(95.5), Text("2024-02-15")],
            vec![Text("Eli"), Text("Employee"), Text("$4,100.00"), Number(820.0), Date(45337.0)],
            vec![Text("Fox"), Text("Contractor"), Number(2250.25), Number(0.0), Text("2024-01-01")],
        ],
    )
}

pub fn department_workbook() -> Vec<u8> {
    workbook(
        &["Employee Name", "Department", "Net Pay"],
        &[
            vec![Text("Ada"), Text("Sales"), Number(1200.0)],
            vec![Text("Brook"), Text("Engineering"), Number(2500.5)],
            vec![Text("Cruz"), Text("Sales"), Number(800.25)],
            vec![Text("Dana"), Text("Admin"), Number(900.0)],
        ],
    )
}

//! Build a bare invoice template with the labels the filler expects.
use umya_spreadsheet::*;

fn main() {
    let mut book = new_file();

    {
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.set_name("Factura");

        // Three pages, 49 rows apart
        for page in 0..3u32 {
            let offset = page * 49;

            sheet.get_cell_mut((10, 6 + offset)).set_value("No. de control:");
            sheet.get_cell_mut((4, 10 + offset)).set_value("Factura No.");
            sheet.get_cell_mut((10, 12 + offset)).set_value("Fecha:");
            sheet.get_cell_mut((10, 13 + offset)).set_value("Vence:");

            // Item header row above the first product line
            sheet.get_cell_mut((2, 18 + offset)).set_value("Descripcion");
            sheet.get_cell_mut((8, 18 + offset)).set_value("Cantidad");
            sheet.get_cell_mut((9, 18 + offset)).set_value("Precio unitario");
            sheet.get_cell_mut((11, 18 + offset)).set_value("Total");
        }
    }

    let path = "template.xlsx";
    writer::xlsx::write(&book, path).expect("Failed to write template.xlsx");
    println!("Created {} (sheet: Factura, 3 pages)", path);
}

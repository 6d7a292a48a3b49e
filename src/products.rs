use crate::error::{Error, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One invoice line item, as exported in the product table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub codigo: String,
    #[serde(rename = "Descripcion")]
    pub descripcion: String,
    #[serde(rename = "Cantidad")]
    pub cantidad: i64,
    #[serde(rename = "PrecioUnitario")]
    pub precio_unitario: f64,
    #[serde(rename = "PrecioTotal")]
    pub precio_total: f64,
}

pub fn load_products(path: &Path) -> Result<Vec<Product>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    read_products(file)
}

pub fn read_products<R: Read>(reader: R) -> Result<Vec<Product>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let products = csv_reader
        .deserialize()
        .collect::<std::result::Result<Vec<Product>, csv::Error>>()?;
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_products_maps_columns() {
        let data = "\
codigo,Descripcion,Cantidad,PrecioUnitario,PrecioTotal
A-100,\"Tornillo, acero\",12,1.5,18
B-200,Tuerca,3,0.25,0.75
";
        let products = read_products(data.as_bytes()).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(
            products[0],
            Product {
                codigo: "A-100".into(),
                descripcion: "Tornillo, acero".into(),
                cantidad: 12,
                precio_unitario: 1.5,
                precio_total: 18.0,
            }
        );
        assert_eq!(products[1].codigo, "B-200");
    }

    #[test]
    fn test_extra_columns_ignored_and_order_free() {
        let data = "\
PrecioTotal,Notas,codigo,Cantidad,Descripcion,PrecioUnitario
10,x,C-1,2,Arandela,5
";
        let products = read_products(data.as_bytes()).unwrap();
        assert_eq!(products[0].descripcion, "Arandela");
        assert_eq!(products[0].cantidad, 2);
        assert_eq!(products[0].precio_total, 10.0);
    }

    #[test]
    fn test_bad_quantity_is_csv_error() {
        let data = "\
codigo,Descripcion,Cantidad,PrecioUnitario,PrecioTotal
A-1,Perno,many,1,1
";
        assert!(matches!(read_products(data.as_bytes()), Err(Error::Csv(_))));
    }

    #[test]
    fn test_load_products_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "codigo,Descripcion,Cantidad,PrecioUnitario,PrecioTotal").unwrap();
        writeln!(file, "X-9,Clavo,100,0.1,10").unwrap();
        let products = load_products(file.path()).unwrap();
        assert_eq!(products.len(), 1);

        let missing = file.path().with_extension("missing");
        assert!(matches!(load_products(&missing), Err(Error::FileNotFound(_))));
    }
}

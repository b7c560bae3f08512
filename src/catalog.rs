//! Schema catalog for the gravity_books database
//!
//! The fixed set of queryable relations: five reporting views plus the base
//! tables. The synthesis prompt and the validator allowlist both read from
//! here, so the two stay in agreement by construction. The catalog is
//! immutable and shared process-wide.

/// One queryable relation: a reporting view or a base table.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    /// Rendered column list with PK/FK hints, as shown to the generator.
    pub columns: &'static str,
}

const VIEWS: &[TableDef] = &[
    TableDef {
        name: "v_books",
        columns: "book_id (PK), title, publisher, language, publication_date, num_pages, authors (CSV)",
    },
    TableDef {
        name: "v_orders",
        columns: "order_id (PK), order_date, customer_id (FK), customer_name, email_masked, shipping_method, order_status, order_total (DECIMAL)",
    },
    TableDef {
        name: "v_order_items",
        columns: "line_id (PK), order_id (FK), book_id (FK), title, publisher, line_total (DECIMAL)",
    },
    TableDef {
        name: "v_customers",
        columns: "customer_id (PK), name, email_masked",
    },
    TableDef {
        name: "v_sales_by_book",
        columns: "book_id (PK), title, publisher, units (INT), revenue (DECIMAL)",
    },
];

const BASE_TABLES: &[TableDef] = &[
    TableDef {
        name: "address",
        columns: "address_id (PK), street_number, street_name, city, country_id (FK)",
    },
    TableDef {
        name: "address_status",
        columns: "status_id (PK), address_status",
    },
    TableDef {
        name: "author",
        columns: "author_id (PK), author_name",
    },
    TableDef {
        name: "book",
        columns: "book_id (PK), title, isbn13, language_id (FK), num_pages, publication_date, publisher_id (FK)",
    },
    TableDef {
        name: "book_author",
        columns: "book_id (PK, FK), author_id (PK, FK) -- primary key is the combination of both columns",
    },
    TableDef {
        name: "book_language",
        columns: "language_id (PK), language_code, language_name",
    },
    TableDef {
        name: "country",
        columns: "country_id (PK), country_name",
    },
    TableDef {
        name: "cust_order",
        columns: "order_id (PK), order_date, customer_id (FK), shipping_method_id (FK), dest_address_id (FK)",
    },
    TableDef {
        name: "customer",
        columns: "customer_id (PK), first_name, last_name, email",
    },
    TableDef {
        name: "customer_address",
        columns: "customer_id (PK, FK), address_id (PK, FK)",
    },
    TableDef {
        name: "order_history",
        columns: "history_id (PK), order_id (FK), status_id (FK), status_date",
    },
    TableDef {
        name: "order_line",
        columns: "line_id (PK), order_id (FK), book_id (FK), price (DECIMAL)",
    },
    TableDef {
        name: "order_status",
        columns: "status_id (PK), status_value",
    },
    TableDef {
        name: "publisher",
        columns: "publisher_id (PK), publisher_name",
    },
    TableDef {
        name: "shipping_method",
        columns: "method_id (PK), method_name, cost (DECIMAL)",
    },
];

static CATALOG: SchemaCatalog = SchemaCatalog {
    views: VIEWS,
    tables: BASE_TABLES,
};

/// Fixed set of queryable view and table names with their column shapes.
pub struct SchemaCatalog {
    views: &'static [TableDef],
    tables: &'static [TableDef],
}

impl SchemaCatalog {
    /// The process-wide read-only catalog.
    pub fn shared() -> &'static SchemaCatalog {
        &CATALOG
    }

    /// Allowlist membership for the validator. Case-insensitive.
    pub fn is_allowed(&self, name: &str) -> bool {
        self.views
            .iter()
            .chain(self.tables.iter())
            .any(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Every queryable name, views first.
    pub fn allowed_tables(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.views
            .iter()
            .chain(self.tables.iter())
            .map(|t| t.name)
    }

    /// Schema block embedded in the synthesis prompt.
    pub fn describe(&self) -> String {
        let mut out = String::from("Simplified database views for NL-to-SQL:\n");
        for view in self.views {
            out.push_str(&format!("- {}: {}\n", view.name, view.columns));
        }
        out.push_str("\nBase tables for the gravity_books schema:\n");
        for table in self.tables {
            out.push_str(&format!("- {}: {}\n", table.name, table.columns));
        }
        out
    }
}

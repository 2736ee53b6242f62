mod test_star_fan_out;
